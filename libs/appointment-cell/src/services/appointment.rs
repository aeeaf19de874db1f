// libs/appointment-cell/src/services/appointment.rs
use chrono::{SecondsFormat, Utc};
use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::{SupabaseClient, USER_SUMMARY_COLUMNS};
use shared_models::auth::{Role, User};

use crate::models::{
    Appointment, AppointmentError, AppointmentListQuery, AppointmentStatus,
    BookAppointmentRequest, UpdateAppointmentRequest,
};
use crate::services::lifecycle::AppointmentLifecycleService;

/// `select=` clause embedding both parties of an appointment.
pub fn appointment_select() -> String {
    format!(
        "*,patient:users!patient_id({cols}),doctor:users!doctor_id({cols})",
        cols = USER_SUMMARY_COLUMNS
    )
}

pub struct AppointmentService {
    supabase: SupabaseClient,
    lifecycle: AppointmentLifecycleService,
}

impl AppointmentService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            lifecycle: AppointmentLifecycleService::new(),
        }
    }

    pub async fn book_appointment(
        &self,
        patient: &User,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Booking appointment for patient {} with doctor {}", patient.id, request.doctor_id);

        let symptoms = request.symptoms.trim();
        if symptoms.is_empty() {
            return Err(AppointmentError::ValidationError("Symptoms or reason for visit are required".to_string()));
        }

        let scheduled_for = request.scheduled_for()?;
        if scheduled_for <= Utc::now() {
            return Err(AppointmentError::ValidationError("Appointment date must be in the future".to_string()));
        }

        let doctor = self.supabase.get_user(&request.doctor_id).await?;
        match doctor {
            Some(doctor) if doctor.role == Role::Doctor => {}
            _ => {
                warn!("Booking rejected: {} is not a doctor", request.doctor_id);
                return Err(AppointmentError::DoctorNotFound);
            }
        }

        let appointment_data = json!({
            "patient_id": patient.id,
            "doctor_id": request.doctor_id,
            "date": scheduled_for.to_rfc3339_opts(SecondsFormat::Secs, true),
            "status": AppointmentStatus::Pending,
            "symptoms": symptoms,
            "notes": request.notes.filter(|n| !n.trim().is_empty()),
        });

        let path = format!("/rest/v1/appointments?select={}", appointment_select());
        let mut created: Vec<Appointment> = self.supabase.request_with_headers(
            Method::POST,
            &path,
            Some(appointment_data),
            Some(SupabaseClient::representation_headers()),
        ).await?;

        if created.is_empty() {
            return Err(AppointmentError::DatabaseError("Failed to create appointment".to_string()));
        }

        let appointment = created.swap_remove(0);
        info!("Appointment {} booked for {}", appointment.id, appointment.date);
        Ok(appointment)
    }

    pub async fn get_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?id=eq.{}&select={}",
            appointment_id,
            appointment_select()
        );

        let mut result: Vec<Appointment> = self.supabase.request(Method::GET, &path, None).await?;

        if result.is_empty() {
            return Err(AppointmentError::NotFound);
        }

        Ok(result.swap_remove(0))
    }

    async fn list(
        &self,
        owner_filter: Option<(&str, Uuid)>,
        query: &AppointmentListQuery,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let mut filters = Vec::new();

        if let Some((column, id)) = owner_filter {
            filters.push(format!("{}=eq.{}", column, id));
        }
        if let Some(status) = query.status {
            filters.push(format!("status=eq.{}", status));
        }
        if let Some(window) = query.when {
            filters.extend(window.filters(Utc::now()));
        }
        filters.push(format!("select={}", appointment_select()));
        filters.push("order=date.desc".to_string());

        let path = format!("/rest/v1/appointments?{}", filters.join("&"));
        let mut appointments: Vec<Appointment> = self.supabase.request(Method::GET, &path, None).await?;
        appointments.retain(|appointment| query.matches(appointment));

        debug!("Fetched {} appointments", appointments.len());
        Ok(appointments)
    }

    pub async fn list_for_patient(
        &self,
        patient_id: Uuid,
        query: &AppointmentListQuery,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        self.list(Some(("patient_id", patient_id)), query).await
    }

    pub async fn list_for_doctor(
        &self,
        doctor_id: Uuid,
        query: &AppointmentListQuery,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        self.list(Some(("doctor_id", doctor_id)), query).await
    }

    pub async fn list_all(&self, query: &AppointmentListQuery) -> Result<Vec<Appointment>, AppointmentError> {
        self.list(None, query).await
    }

    /// Status and notes changes by the appointment's own doctor.
    pub async fn update_by_doctor(
        &self,
        appointment_id: Uuid,
        doctor_id: Uuid,
        request: UpdateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Doctor {} updating appointment {}", doctor_id, appointment_id);

        let scope = format!("id=eq.{}&doctor_id=eq.{}", appointment_id, doctor_id);

        let lookup = format!("/rest/v1/appointments?{}&select=id,status", scope);
        let existing: Vec<Value> = self.supabase.request(Method::GET, &lookup, None).await?;
        let current_status: AppointmentStatus = match existing.first() {
            Some(row) => serde_json::from_value(row["status"].clone())
                .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?,
            None => return Err(AppointmentError::NotFound),
        };

        let mut update_data = Map::new();

        if let Some(status) = request.status {
            self.lifecycle.validate_status_transition(current_status, status)?;
            update_data.insert("status".to_string(), json!(status));
        }
        if let Some(notes) = request.notes.filter(|n| !n.trim().is_empty()) {
            update_data.insert("notes".to_string(), json!(notes));
        }
        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        // Only patch the row if its status is still the one validated above.
        let path = format!(
            "/rest/v1/appointments?{}&status=eq.{}&select={}",
            scope,
            current_status,
            appointment_select()
        );
        let mut updated: Vec<Appointment> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(Value::Object(update_data)),
            Some(SupabaseClient::representation_headers()),
        ).await?;

        if updated.is_empty() {
            warn!("Appointment {} changed status during update", appointment_id);
            return Err(AppointmentError::StatusChanged);
        }

        let appointment = updated.swap_remove(0);
        info!("Appointment {} now {}", appointment.id, appointment.status);
        Ok(appointment)
    }

    /// Deletes the patient's own appointment in a single filtered request, so
    /// a booking the doctor has already acted on is never removed.
    pub async fn cancel_pending(
        &self,
        appointment_id: Uuid,
        patient_id: Uuid,
    ) -> Result<(), AppointmentError> {
        debug!("Patient {} cancelling appointment {}", patient_id, appointment_id);

        let path = format!(
            "/rest/v1/appointments?id=eq.{}&patient_id=eq.{}&status=eq.{}",
            appointment_id,
            patient_id,
            AppointmentStatus::Pending
        );

        let deleted: Vec<Value> = self.supabase.request_with_headers(
            Method::DELETE,
            &path,
            None,
            Some(SupabaseClient::representation_headers()),
        ).await?;

        if deleted.is_empty() {
            warn!("Appointment {} not cancellable by {}", appointment_id, patient_id);
            return Err(AppointmentError::NotCancellable);
        }

        info!("Appointment {} cancelled", appointment_id);
        Ok(())
    }
}
