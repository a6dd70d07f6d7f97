//! Form client: turns a `CandidateDraft` into a create request and reports
//! the outcome as a single success or error banner.
//!
//! No retries and no offline queue. One submit, one request, one banner.

pub mod draft;

use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use tracing::{debug, warn};

use crate::client::draft::{CandidateDraft, DraftError};

pub const SUBMIT_SUCCEEDED: &str = "Candidato añadido exitosamente!";
pub const SUBMIT_FAILED: &str = "Error al añadir candidato";

/// The banner shown after a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Error(String),
}

impl Notification {
    pub fn is_success(&self) -> bool {
        matches!(self, Notification::Success(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Notification::Success(msg) | Notification::Error(msg) => msg,
        }
    }
}

#[derive(Clone)]
pub struct FormClient {
    client: Client,
    base_url: String,
}

impl FormClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn candidates_url(&self) -> String {
        format!("{}/api/candidates", self.base_url.trim_end_matches('/'))
    }

    /// Validates the draft locally and posts it. An email without `@` or an
    /// unparsable date aborts before any request is sent.
    pub async fn submit(&self, draft: &CandidateDraft) -> Notification {
        let submission = match draft.to_submission() {
            Ok(submission) => submission,
            Err(e) => return Notification::Error(e.to_string()),
        };
        if !draft.has_valid_email() {
            return Notification::Error(DraftError::InvalidEmail.to_string());
        }

        let url = self.candidates_url();
        debug!("Submitting candidate draft to {url}");

        match self.client.post(&url).json(&submission).send().await {
            Ok(response) if response.status().is_success() => {
                Notification::Success(SUBMIT_SUCCEEDED.to_string())
            }
            Ok(response) => {
                warn!("Candidate submit rejected with status {}", response.status());
                Notification::Error(SUBMIT_FAILED.to_string())
            }
            Err(e) => {
                warn!("Candidate submit failed: {e}");
                Notification::Error(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::candidates::memory::InMemoryCandidateStore;
    use crate::client::draft::{EducationField, ExperienceField, INVALID_EMAIL};
    use crate::routes::build_router;
    use crate::state::AppState;
    use crate::uploads::UploadStore;

    fn local_client(base_url: String) -> FormClient {
        let client = Client::builder().no_proxy().build().unwrap();
        FormClient::with_client(client, base_url)
    }

    async fn spawn_server() -> (String, Arc<InMemoryCandidateStore>) {
        let store = Arc::new(InMemoryCandidateStore::default());
        let state = AppState {
            store: store.clone(),
            uploads: UploadStore::new(std::env::temp_dir()),
        };
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, build_router(state)).await.unwrap();
        });
        (format!("http://{addr}/"), store)
    }

    fn draft() -> CandidateDraft {
        let mut draft = CandidateDraft::new();
        draft.first_name = "Jane".to_string();
        draft.last_name = "Doe".to_string();
        draft.email = "jane.doe@example.com".to_string();
        draft.set_education_field(0, EducationField::Institution, "University B");
        draft.set_education_field(0, EducationField::Degree, "MSc");
        draft.set_education_field(0, EducationField::StartDate, "2016-09-01");
        draft.set_education_field(0, EducationField::EndDate, "2020-06-01");
        draft.set_experience_field(0, ExperienceField::Company, "Company B");
        draft.set_experience_field(0, ExperienceField::Position, "Manager");
        draft.set_experience_field(0, ExperienceField::StartDate, "2020-07-01");
        draft.set_experience_field(0, ExperienceField::Responsibilities, "Managing projects");
        draft
    }

    #[test]
    fn test_candidates_url_handles_trailing_slash() {
        let client = local_client("http://localhost:3010/".to_string());
        assert_eq!(client.candidates_url(), "http://localhost:3010/api/candidates");
    }

    #[tokio::test]
    async fn test_invalid_email_never_reaches_server() {
        let (base_url, store) = spawn_server().await;
        let mut draft = draft();
        draft.email = "not-an-email".to_string();

        let notification = local_client(base_url).submit(&draft).await;

        assert_eq!(notification, Notification::Error(INVALID_EMAIL.to_string()));
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_submit_creates_candidate() {
        let (base_url, store) = spawn_server().await;

        let notification = local_client(base_url).submit(&draft()).await;

        assert!(notification.is_success());
        assert_eq!(notification.message(), SUBMIT_SUCCEEDED);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_submit_shows_error_banner() {
        let (base_url, _store) = spawn_server().await;
        let client = local_client(base_url);
        let mut draft = draft();
        draft.last_name = String::new();

        let notification = client.submit(&draft).await;

        assert_eq!(notification, Notification::Error(SUBMIT_FAILED.to_string()));
    }
}
