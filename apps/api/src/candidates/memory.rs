//! In-process `CandidateStore` backends used by handler and router tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::candidates::store::{
    CandidateStore, CREATE_FAILED, DELETE_FAILED, FIND_FAILED, UPDATE_FAILED,
};
use crate::candidates::validation::{
    CandidateUpdate, EducationInput, ExperienceInput, NewCandidate,
};
use crate::errors::AppError;
use crate::models::candidate::{Candidate, CandidateRow, EducationRow, ExperienceRow};

/// Aggregates keyed by email.
#[derive(Default)]
pub struct InMemoryCandidateStore {
    candidates: Mutex<HashMap<String, Candidate>>,
}

impl InMemoryCandidateStore {
    pub fn len(&self) -> usize {
        self.candidates.lock().unwrap().len()
    }
}

fn education_rows(candidate_id: Uuid, entries: Vec<EducationInput>) -> Vec<EducationRow> {
    entries
        .into_iter()
        .map(|edu| EducationRow {
            id: Uuid::new_v4(),
            candidate_id,
            institution: edu.institution,
            degree: edu.degree,
            start_date: edu.start_date,
            end_date: edu.end_date,
            description: edu.description,
        })
        .collect()
}

fn experience_rows(candidate_id: Uuid, entries: Vec<ExperienceInput>) -> Vec<ExperienceRow> {
    entries
        .into_iter()
        .map(|exp| ExperienceRow {
            id: Uuid::new_v4(),
            candidate_id,
            company: exp.company,
            position: exp.position,
            start_date: exp.start_date,
            end_date: exp.end_date,
            responsibilities: exp.responsibilities,
        })
        .collect()
}

#[async_trait]
impl CandidateStore for InMemoryCandidateStore {
    async fn create(&self, new: NewCandidate) -> Result<Candidate, AppError> {
        let mut candidates = self.candidates.lock().unwrap();
        if candidates.contains_key(&new.email) {
            return Err(AppError::store(CREATE_FAILED)(
                sqlx::Error::Protocol("duplicate key value violates unique constraint".into()),
            ));
        }

        let id = Uuid::new_v4();
        let now = Utc::now();
        let candidate = Candidate {
            candidate: CandidateRow {
                id,
                first_name: new.first_name,
                last_name: new.last_name,
                email: new.email.clone(),
                phone: new.phone,
                address: new.address,
                resume_path: new.resume_path,
                created_at: now,
                updated_at: now,
            },
            education: education_rows(id, new.education),
            experience: experience_rows(id, new.experience),
        };
        candidates.insert(new.email, candidate.clone());
        Ok(candidate)
    }

    async fn find_by_email(&self, email: &str) -> Result<Candidate, AppError> {
        self.candidates
            .lock()
            .unwrap()
            .get(email)
            .cloned()
            .ok_or_else(AppError::candidate_not_found)
    }

    async fn replace_by_email(
        &self,
        email: &str,
        update: CandidateUpdate,
    ) -> Result<Candidate, AppError> {
        let mut candidates = self.candidates.lock().unwrap();
        let existing = candidates
            .get_mut(email)
            .ok_or_else(AppError::candidate_not_found)?;

        let row = &mut existing.candidate;
        if let Some(first_name) = update.first_name {
            row.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            row.last_name = last_name;
        }
        if let Some(phone) = update.phone {
            row.phone = Some(phone);
        }
        if let Some(address) = update.address {
            row.address = Some(address);
        }
        row.updated_at = Utc::now();

        let id = row.id;
        existing.education = education_rows(id, update.education);
        existing.experience = experience_rows(id, update.experience);
        Ok(existing.clone())
    }

    async fn delete_by_email(&self, email: &str) -> Result<Candidate, AppError> {
        self.candidates
            .lock()
            .unwrap()
            .remove(email)
            .ok_or_else(AppError::candidate_not_found)
    }
}

/// A store whose backend is always unreachable.
pub struct UnavailableCandidateStore;

fn unavailable(message: &'static str) -> AppError {
    AppError::store(message)(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl CandidateStore for UnavailableCandidateStore {
    async fn create(&self, _new: NewCandidate) -> Result<Candidate, AppError> {
        Err(unavailable(CREATE_FAILED))
    }

    async fn find_by_email(&self, _email: &str) -> Result<Candidate, AppError> {
        Err(unavailable(FIND_FAILED))
    }

    async fn replace_by_email(
        &self,
        _email: &str,
        _update: CandidateUpdate,
    ) -> Result<Candidate, AppError> {
        Err(unavailable(UPDATE_FAILED))
    }

    async fn delete_by_email(&self, _email: &str) -> Result<Candidate, AppError> {
        Err(unavailable(DELETE_FAILED))
    }
}
