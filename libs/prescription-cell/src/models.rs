// libs/prescription-cell/src/models.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use appointment_cell::Appointment;
use shared_models::auth::UserSummary;

// ==============================================================================
// CORE PRESCRIPTION MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Medicine {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
}

impl Medicine {
    /// Every field is required and must carry some text.
    pub fn validate(&self, index: usize) -> Result<(), PrescriptionError> {
        let fields = [
            ("name", &self.name),
            ("dosage", &self.dosage),
            ("frequency", &self.frequency),
            ("duration", &self.duration),
        ];

        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(PrescriptionError::ValidationError(format!(
                    "Medicine {} is missing its {}",
                    index + 1,
                    field
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prescription {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_id: Option<Uuid>,
    #[serde(default)]
    pub medicines: Vec<Medicine>,
    pub diagnosis: String,
    pub notes: Option<String>,
    pub valid_until: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<UserSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor: Option<UserSummary>,
    #[serde(default)]
    pub appointment: Option<Appointment>,
}

impl Prescription {
    pub fn parties(&self) -> [Uuid; 2] {
        [self.patient_id, self.doctor_id]
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePrescriptionRequest {
    #[serde(alias = "patientId")]
    pub patient_id: Uuid,
    #[serde(default, alias = "appointmentId")]
    pub appointment_id: Option<Uuid>,
    #[serde(default)]
    pub medicines: Vec<Medicine>,
    pub diagnosis: String,
    pub notes: Option<String>,
    #[serde(default, alias = "validUntil")]
    pub valid_until: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePrescriptionRequest {
    pub medicines: Option<Vec<Medicine>>,
    pub diagnosis: Option<String>,
    pub notes: Option<String>,
    #[serde(default, alias = "validUntil")]
    pub valid_until: Option<String>,
}

pub fn validate_medicines(medicines: &[Medicine]) -> Result<(), PrescriptionError> {
    medicines
        .iter()
        .enumerate()
        .try_for_each(|(index, medicine)| medicine.validate(index))
}

/// Accepts an RFC 3339 timestamp or a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_valid_until(raw: &str) -> Result<DateTime<Utc>, PrescriptionError> {
    let raw = raw.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| PrescriptionError::ValidationError(format!("Invalid valid_until date: {}", raw)))
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Error, Debug)]
pub enum PrescriptionError {
    #[error("Prescription not found")]
    NotFound,

    #[error("Patient not found")]
    PatientNotFound,

    #[error("Appointment not found")]
    AppointmentNotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<anyhow::Error> for PrescriptionError {
    fn from(err: anyhow::Error) -> Self {
        PrescriptionError::DatabaseError(err.to_string())
    }
}
