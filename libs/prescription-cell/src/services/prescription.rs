// libs/prescription-cell/src/services/prescription.rs
use chrono::{SecondsFormat, Utc};
use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use appointment_cell::{AppointmentError, AppointmentService};
use shared_config::AppConfig;
use shared_database::supabase::{SupabaseClient, USER_SUMMARY_COLUMNS};
use shared_models::auth::User;

use crate::models::{
    parse_valid_until, validate_medicines, CreatePrescriptionRequest, Prescription,
    PrescriptionError, UpdatePrescriptionRequest,
};

/// `select=` clause embedding both parties and the linked appointment.
pub fn prescription_select() -> String {
    format!(
        "*,patient:users!patient_id({cols}),doctor:users!doctor_id({cols}),appointment:appointments!appointment_id(*)",
        cols = USER_SUMMARY_COLUMNS
    )
}

pub struct PrescriptionService {
    supabase: SupabaseClient,
    appointments: AppointmentService,
}

impl PrescriptionService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            appointments: AppointmentService::new(config),
        }
    }

    pub async fn create_prescription(
        &self,
        doctor: &User,
        request: CreatePrescriptionRequest,
    ) -> Result<Prescription, PrescriptionError> {
        debug!("Doctor {} issuing prescription for patient {}", doctor.id, request.patient_id);

        let diagnosis = request.diagnosis.trim();
        if diagnosis.is_empty() {
            return Err(PrescriptionError::ValidationError("Diagnosis is required".to_string()));
        }
        validate_medicines(&request.medicines)?;

        let valid_until = request
            .valid_until
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(parse_valid_until)
            .transpose()?;

        if self.supabase.get_user(&request.patient_id).await?.is_none() {
            warn!("Prescription rejected: patient {} does not exist", request.patient_id);
            return Err(PrescriptionError::PatientNotFound);
        }

        if let Some(appointment_id) = request.appointment_id {
            self.appointments.get_appointment(appointment_id).await.map_err(|e| match e {
                AppointmentError::NotFound => PrescriptionError::AppointmentNotFound,
                other => PrescriptionError::DatabaseError(other.to_string()),
            })?;
        }

        let prescription_data = json!({
            "patient_id": request.patient_id,
            "doctor_id": doctor.id,
            "appointment_id": request.appointment_id,
            "medicines": request.medicines,
            "diagnosis": diagnosis,
            "notes": request.notes.filter(|n| !n.trim().is_empty()),
            "valid_until": valid_until.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true)),
        });

        let path = format!("/rest/v1/prescriptions?select={}", prescription_select());
        let mut created: Vec<Prescription> = self.supabase.request_with_headers(
            Method::POST,
            &path,
            Some(prescription_data),
            Some(SupabaseClient::representation_headers()),
        ).await?;

        if created.is_empty() {
            return Err(PrescriptionError::DatabaseError("Failed to create prescription".to_string()));
        }

        let prescription = created.swap_remove(0);
        info!("Prescription {} issued by doctor {}", prescription.id, doctor.id);
        Ok(prescription)
    }

    pub async fn get_prescription(&self, prescription_id: Uuid) -> Result<Prescription, PrescriptionError> {
        let path = format!(
            "/rest/v1/prescriptions?id=eq.{}&select={}",
            prescription_id,
            prescription_select()
        );

        let mut result: Vec<Prescription> = self.supabase.request(Method::GET, &path, None).await?;

        if result.is_empty() {
            return Err(PrescriptionError::NotFound);
        }

        Ok(result.swap_remove(0))
    }

    async fn list_by(&self, column: &str, id: Uuid) -> Result<Vec<Prescription>, PrescriptionError> {
        let path = format!(
            "/rest/v1/prescriptions?{}=eq.{}&select={}&order=created_at.desc",
            column,
            id,
            prescription_select()
        );

        let prescriptions: Vec<Prescription> = self.supabase.request(Method::GET, &path, None).await?;

        debug!("Fetched {} prescriptions by {}", prescriptions.len(), column);
        Ok(prescriptions)
    }

    pub async fn list_for_patient(&self, patient_id: Uuid) -> Result<Vec<Prescription>, PrescriptionError> {
        self.list_by("patient_id", patient_id).await
    }

    pub async fn list_for_doctor(&self, doctor_id: Uuid) -> Result<Vec<Prescription>, PrescriptionError> {
        self.list_by("doctor_id", doctor_id).await
    }

    /// Edits by the issuing doctor. Absent or blank text fields keep their
    /// value; a `medicines` list, even an empty one, replaces the old list.
    pub async fn update_by_doctor(
        &self,
        prescription_id: Uuid,
        doctor_id: Uuid,
        request: UpdatePrescriptionRequest,
    ) -> Result<Prescription, PrescriptionError> {
        debug!("Doctor {} updating prescription {}", doctor_id, prescription_id);

        let scope = format!("id=eq.{}&doctor_id=eq.{}", prescription_id, doctor_id);

        let lookup = format!("/rest/v1/prescriptions?{}&select=id", scope);
        let existing: Vec<Value> = self.supabase.request(Method::GET, &lookup, None).await?;
        if existing.is_empty() {
            return Err(PrescriptionError::NotFound);
        }

        let mut update_data = Map::new();

        if let Some(medicines) = request.medicines {
            validate_medicines(&medicines)?;
            update_data.insert("medicines".to_string(), json!(medicines));
        }
        if let Some(diagnosis) = request.diagnosis.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            update_data.insert("diagnosis".to_string(), json!(diagnosis));
        }
        if let Some(notes) = request.notes.filter(|n| !n.trim().is_empty()) {
            update_data.insert("notes".to_string(), json!(notes));
        }
        if let Some(raw) = request.valid_until.as_deref().filter(|raw| !raw.trim().is_empty()) {
            let valid_until = parse_valid_until(raw)?;
            update_data.insert(
                "valid_until".to_string(),
                json!(valid_until.to_rfc3339_opts(SecondsFormat::Secs, true)),
            );
        }
        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/prescriptions?{}&select={}", scope, prescription_select());
        let mut updated: Vec<Prescription> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(Value::Object(update_data)),
            Some(SupabaseClient::representation_headers()),
        ).await?;

        if updated.is_empty() {
            return Err(PrescriptionError::NotFound);
        }

        info!("Prescription {} updated", prescription_id);
        Ok(updated.swap_remove(0))
    }
}
