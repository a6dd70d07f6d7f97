//! Resume uploads: files are kept on local disk and only ever referenced by
//! path. Content is never opened or parsed.

pub mod handlers;

use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;

pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

pub const FILE_TYPE_NOT_ALLOWED: &str = "Tipo de archivo no permitido";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub file_path: String,
    pub file_type: String,
}

pub fn is_allowed(content_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&content_type)
}

/// Writes uploads into one directory as `<millis>-<original name>`.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    last_stamp: Arc<AtomicI64>,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            last_stamp: Arc::new(AtomicI64::new(0)),
        }
    }

    /// Millisecond timestamp, bumped past the previous one when two uploads
    /// land in the same millisecond.
    fn next_stamp(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let mut prev = self.last_stamp.load(Ordering::Acquire);
        loop {
            let next = now.max(prev + 1);
            match self
                .last_stamp
                .compare_exchange(prev, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return next,
                Err(actual) => prev = actual,
            }
        }
    }

    pub async fn save(
        &self,
        original_name: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<StoredFile, AppError> {
        if !is_allowed(content_type) {
            return Err(AppError::FileType(FILE_TYPE_NOT_ALLOWED.to_string()));
        }

        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create upload dir {}", self.dir.display()))?;

        let file_name = format!("{}-{}", self.next_stamp(), base_name(original_name));
        let path = self.dir.join(file_name);
        tokio::fs::write(&path, &data)
            .await
            .with_context(|| format!("failed to write upload {}", path.display()))?;

        info!("Stored upload {} ({} bytes)", path.display(), data.len());

        Ok(StoredFile {
            file_path: path.to_string_lossy().into_owned(),
            file_type: content_type.to_string(),
        })
    }
}

/// Last path component of a client-supplied file name.
fn base_name(original_name: &str) -> &str {
    match original_name.rsplit(['/', '\\']).next() {
        Some(name) if !name.is_empty() && name != ".." && name != "." => name,
        _ => "resume",
    }
}
