//! The candidate form's in-memory draft and its conversion into the JSON
//! document posted to `POST /api/candidates`.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

pub const INVALID_EMAIL: &str = "El correo electrónico no es válido";

#[derive(Debug, Error, PartialEq)]
pub enum DraftError {
    #[error("{}", INVALID_EMAIL)]
    InvalidEmail,

    #[error("Fecha no válida en {field}: '{value}'")]
    InvalidDate { field: String, value: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationDraft {
    pub institution: String,
    pub degree: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceDraft {
    pub company: String,
    pub position: String,
    pub start_date: String,
    pub end_date: String,
    pub responsibilities: String,
}

/// Field selectors for the form editing operations. The `submit` command
/// loads a whole draft from disk, so only an interactive form constructs
/// these.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EducationField {
    Institution,
    Degree,
    StartDate,
    EndDate,
    Description,
}

#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceField {
    Company,
    Position,
    StartDate,
    EndDate,
    Responsibilities,
}

/// What the user has typed so far. Dates are kept as entered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CandidateDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub education: Vec<EducationDraft>,
    pub experience: Vec<ExperienceDraft>,
}

/// A fresh form shows one empty education and one empty experience entry.
impl Default for CandidateDraft {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            education: vec![EducationDraft::default()],
            experience: vec![ExperienceDraft::default()],
        }
    }
}

impl EducationDraft {
    fn field_mut(&mut self, field: EducationField) -> &mut String {
        match field {
            EducationField::Institution => &mut self.institution,
            EducationField::Degree => &mut self.degree,
            EducationField::StartDate => &mut self.start_date,
            EducationField::EndDate => &mut self.end_date,
            EducationField::Description => &mut self.description,
        }
    }

    fn is_blank(&self) -> bool {
        [
            &self.institution,
            &self.degree,
            &self.start_date,
            &self.end_date,
            &self.description,
        ]
        .iter()
        .all(|v| v.trim().is_empty())
    }
}

impl ExperienceDraft {
    fn field_mut(&mut self, field: ExperienceField) -> &mut String {
        match field {
            ExperienceField::Company => &mut self.company,
            ExperienceField::Position => &mut self.position,
            ExperienceField::StartDate => &mut self.start_date,
            ExperienceField::EndDate => &mut self.end_date,
            ExperienceField::Responsibilities => &mut self.responsibilities,
        }
    }

    fn is_blank(&self) -> bool {
        [
            &self.company,
            &self.position,
            &self.start_date,
            &self.end_date,
            &self.responsibilities,
        ]
        .iter()
        .all(|v| v.trim().is_empty())
    }
}

/// Form editing operations.
#[allow(dead_code)]
impl CandidateDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_education(&mut self) {
        self.education.push(EducationDraft::default());
    }

    /// Out-of-range indices are ignored.
    pub fn remove_education(&mut self, index: usize) {
        if index < self.education.len() {
            self.education.remove(index);
        }
    }

    pub fn set_education_field(
        &mut self,
        index: usize,
        field: EducationField,
        value: impl Into<String>,
    ) {
        if let Some(entry) = self.education.get_mut(index) {
            *entry.field_mut(field) = value.into();
        }
    }

    pub fn add_experience(&mut self) {
        self.experience.push(ExperienceDraft::default());
    }

    pub fn remove_experience(&mut self, index: usize) {
        if index < self.experience.len() {
            self.experience.remove(index);
        }
    }

    pub fn set_experience_field(
        &mut self,
        index: usize,
        field: ExperienceField,
        value: impl Into<String>,
    ) {
        if let Some(entry) = self.experience.get_mut(index) {
            *entry.field_mut(field) = value.into();
        }
    }
}

impl CandidateDraft {
    pub fn has_valid_email(&self) -> bool {
        self.email.contains('@')
    }

    /// Builds the request body. Entirely blank entries are dropped and blank
    /// dates become `null`.
    pub fn to_submission(&self) -> Result<Submission, DraftError> {
        let education = self
            .education
            .iter()
            .enumerate()
            .filter(|(_, edu)| !edu.is_blank())
            .map(|(i, edu)| -> Result<EducationSubmission, DraftError> {
                Ok(EducationSubmission {
                    institution: edu.institution.clone(),
                    degree: edu.degree.clone(),
                    start_date: parse_date(&format!("education[{i}].startDate"), &edu.start_date)?,
                    end_date: parse_date(&format!("education[{i}].endDate"), &edu.end_date)?,
                    description: Some(edu.description.clone()).filter(|d| !d.trim().is_empty()),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let experience = self
            .experience
            .iter()
            .enumerate()
            .filter(|(_, exp)| !exp.is_blank())
            .map(|(i, exp)| -> Result<ExperienceSubmission, DraftError> {
                Ok(ExperienceSubmission {
                    company: exp.company.clone(),
                    position: exp.position.clone(),
                    start_date: parse_date(&format!("experience[{i}].startDate"), &exp.start_date)?,
                    end_date: parse_date(&format!("experience[{i}].endDate"), &exp.end_date)?,
                    responsibilities: exp.responsibilities.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Submission {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            education,
            experience,
        })
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EducationSubmission {
    pub institution: String,
    pub degree: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceSubmission {
    pub company: String,
    pub position: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub end_date: Option<DateTime<Utc>>,
    pub responsibilities: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub education: Vec<EducationSubmission>,
    pub experience: Vec<ExperienceSubmission>,
}

/// `YYYY-MM-DD` (as a date input yields) or a full RFC 3339 timestamp.
fn parse_date(field: &str, value: &str) -> Result<Option<DateTime<Utc>>, DraftError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(Some(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))));
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| Some(dt.with_timezone(&Utc)))
        .map_err(|_| DraftError::InvalidDate {
            field: field.to_string(),
            value: value.to_string(),
        })
}

fn serialize_timestamp<S: Serializer>(
    value: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(dt) => serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
        None => serializer.serialize_none(),
    }
}
