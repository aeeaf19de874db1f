// libs/prescription-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use tracing::warn;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extract::{ApiJson, ApiPath};
use shared_utils::guards::{require_doctor, require_party_or_admin};

use crate::models::{
    CreatePrescriptionRequest, Prescription, PrescriptionError, UpdatePrescriptionRequest,
};
use crate::services::PrescriptionService;

fn to_app_error(err: PrescriptionError, context: &str) -> AppError {
    match err {
        PrescriptionError::NotFound
        | PrescriptionError::PatientNotFound
        | PrescriptionError::AppointmentNotFound => AppError::NotFound(err.to_string()),
        PrescriptionError::ValidationError(msg) => AppError::ValidationError(msg),
        PrescriptionError::DatabaseError(msg) => AppError::Internal(format!("{}: {}", context, msg)),
    }
}

#[axum::debug_handler]
pub async fn create_prescription(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    ApiJson(request): ApiJson<CreatePrescriptionRequest>,
) -> Result<(StatusCode, Json<Prescription>), AppError> {
    require_doctor(&user)?;

    let service = PrescriptionService::new(&state);

    let prescription = service.create_prescription(&user, request).await
        .map_err(|e| to_app_error(e, "Error creating prescription"))?;

    Ok((StatusCode::CREATED, Json(prescription)))
}

#[axum::debug_handler]
pub async fn get_my_prescriptions(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<Prescription>>, AppError> {
    let service = PrescriptionService::new(&state);

    let prescriptions = service.list_for_patient(user.id).await
        .map_err(|e| to_app_error(e, "Error fetching prescriptions"))?;

    Ok(Json(prescriptions))
}

#[axum::debug_handler]
pub async fn get_patient_prescriptions(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    ApiPath(patient_id): ApiPath<Uuid>,
) -> Result<Json<Vec<Prescription>>, AppError> {
    require_doctor(&user)?;

    let service = PrescriptionService::new(&state);

    let prescriptions = service.list_for_patient(patient_id).await
        .map_err(|e| to_app_error(e, "Error fetching prescriptions"))?;

    Ok(Json(prescriptions))
}

#[axum::debug_handler]
pub async fn get_doctor_prescriptions(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<Prescription>>, AppError> {
    require_doctor(&user)?;

    let service = PrescriptionService::new(&state);

    let prescriptions = service.list_for_doctor(user.id).await
        .map_err(|e| to_app_error(e, "Error fetching prescriptions"))?;

    Ok(Json(prescriptions))
}

#[axum::debug_handler]
pub async fn update_prescription(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    ApiPath(prescription_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdatePrescriptionRequest>,
) -> Result<Json<Prescription>, AppError> {
    require_doctor(&user)?;

    let service = PrescriptionService::new(&state);

    let prescription = service.update_by_doctor(prescription_id, user.id, request).await
        .map_err(|e| to_app_error(e, "Error updating prescription"))?;

    Ok(Json(prescription))
}

#[axum::debug_handler]
pub async fn get_prescription(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    ApiPath(prescription_id): ApiPath<Uuid>,
) -> Result<Json<Prescription>, AppError> {
    let service = PrescriptionService::new(&state);

    let prescription = service.get_prescription(prescription_id).await
        .map_err(|e| to_app_error(e, "Error fetching prescription"))?;

    require_party_or_admin(&user, &prescription.parties()).inspect_err(|_| {
        warn!("Prescription {} read refused for {}", prescription_id, user.id);
    })?;

    Ok(Json(prescription))
}
