//! Request bodies for the candidate API and the checks that turn them into
//! the validated inputs the store accepts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, MISSING_REQUIRED_FIELDS};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EducationInput {
    pub institution: String,
    pub degree: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceInput {
    pub company: String,
    pub position: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub responsibilities: String,
}

/// POST /api/candidates body. Scalar fields are optional here so that a
/// missing name or email is reported as a validation error, not a decode error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCandidateRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub resume_path: Option<String>,
    #[serde(default)]
    pub education: Vec<EducationInput>,
    #[serde(default)]
    pub experience: Vec<ExperienceInput>,
}

/// PUT /api/candidates/:email body. Omitted scalars are left unchanged;
/// omitted collections are replaced with empty ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCandidateRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub education: Vec<EducationInput>,
    #[serde(default)]
    pub experience: Vec<ExperienceInput>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCandidate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub resume_path: Option<String>,
    pub education: Vec<EducationInput>,
    pub experience: Vec<ExperienceInput>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub education: Vec<EducationInput>,
    pub experience: Vec<ExperienceInput>,
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !is_blank(v))
}

impl CreateCandidateRequest {
    pub fn validate(self) -> Result<NewCandidate, AppError> {
        let (Some(first_name), Some(last_name), Some(email)) = (
            present(self.first_name),
            present(self.last_name),
            present(self.email),
        ) else {
            return Err(AppError::Validation(MISSING_REQUIRED_FIELDS.to_string()));
        };

        validate_entries(&self.education, &self.experience)?;

        Ok(NewCandidate {
            first_name,
            last_name,
            email: email.trim().to_string(),
            phone: self.phone,
            address: self.address,
            resume_path: present(self.resume_path),
            education: self.education,
            experience: self.experience,
        })
    }
}

impl UpdateCandidateRequest {
    pub fn validate(self) -> Result<CandidateUpdate, AppError> {
        for (field, value) in [("firstName", &self.first_name), ("lastName", &self.last_name)] {
            if value.as_deref().is_some_and(is_blank) {
                return Err(AppError::Validation(format!("{field} no puede estar vacío")));
            }
        }

        validate_entries(&self.education, &self.experience)?;

        Ok(CandidateUpdate {
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            address: self.address,
            education: self.education,
            experience: self.experience,
        })
    }
}

fn validate_entries(
    education: &[EducationInput],
    experience: &[ExperienceInput],
) -> Result<(), AppError> {
    for (i, edu) in education.iter().enumerate() {
        require_text(&format!("education[{i}].institution"), &edu.institution)?;
        require_text(&format!("education[{i}].degree"), &edu.degree)?;
    }
    for (i, exp) in experience.iter().enumerate() {
        require_text(&format!("experience[{i}].company"), &exp.company)?;
        require_text(&format!("experience[{i}].position"), &exp.position)?;
    }
    Ok(())
}

fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if is_blank(value) {
        return Err(AppError::Validation(format!("{field} es obligatorio")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn jane() -> serde_json::Value {
        json!({
            "firstName": "Jane",
            "lastName": "Doe",
            "email": "jane.doe@example.com",
            "phone": "0987654321",
            "address": "456 Another St",
            "education": [{
                "institution": "University B",
                "degree": "MSc",
                "startDate": "2016-09-01T00:00:00.000Z",
                "endDate": "2020-06-01T00:00:00.000Z"
            }],
            "experience": [{
                "company": "Company B",
                "position": "Manager",
                "startDate": "2020-07-01T00:00:00.000Z",
                "endDate": "2022-08-01T00:00:00.000Z",
                "responsibilities": "Managing projects"
            }]
        })
    }

    #[test]
    fn test_valid_create_request() {
        let req: CreateCandidateRequest = serde_json::from_value(jane()).unwrap();
        let new = req.validate().unwrap();
        assert_eq!(new.first_name, "Jane");
        assert_eq!(new.education.len(), 1);
        assert_eq!(new.experience.len(), 1);
        assert!(new.education[0].description.is_none());
    }

    #[test]
    fn test_each_required_field_is_enforced() {
        for field in ["firstName", "lastName", "email"] {
            let mut body = jane();
            body.as_object_mut().unwrap().remove(field);
            let req: CreateCandidateRequest = serde_json::from_value(body).unwrap();
            match req.validate() {
                Err(AppError::Validation(msg)) => assert_eq!(msg, MISSING_REQUIRED_FIELDS),
                other => panic!("expected validation error for {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_empty_string_counts_as_missing() {
        let mut body = jane();
        body["email"] = json!("");
        let req: CreateCandidateRequest = serde_json::from_value(body).unwrap();
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_collections_default_to_empty() {
        let req: CreateCandidateRequest = serde_json::from_value(json!({
            "firstName": "A", "lastName": "B", "email": "a@b.c"
        }))
        .unwrap();
        let new = req.validate().unwrap();
        assert!(new.education.is_empty());
        assert!(new.experience.is_empty());
    }

    #[test]
    fn test_entry_missing_start_date_fails_to_decode() {
        let mut body = jane();
        body["education"][0].as_object_mut().unwrap().remove("startDate");
        assert!(serde_json::from_value::<CreateCandidateRequest>(body).is_err());
    }

    #[test]
    fn test_blank_entry_text_is_rejected() {
        let mut body = jane();
        body["experience"][0]["company"] = json!("  ");
        let req: CreateCandidateRequest = serde_json::from_value(body).unwrap();
        match req.validate() {
            Err(AppError::Validation(msg)) => assert!(msg.contains("experience[0].company")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_update_leaves_omitted_scalars_unset() {
        let req: UpdateCandidateRequest =
            serde_json::from_value(json!({ "phone": "555" })).unwrap();
        let update = req.validate().unwrap();
        assert!(update.first_name.is_none());
        assert_eq!(update.phone.as_deref(), Some("555"));
        assert!(update.education.is_empty());
    }

    #[test]
    fn test_update_rejects_blank_name() {
        let req: UpdateCandidateRequest =
            serde_json::from_value(json!({ "lastName": "" })).unwrap();
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));
    }
}
