// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extract::{ApiJson, ApiPath, ApiQuery};
use shared_utils::guards::{require_doctor, require_doctor_or_admin};

use crate::models::{
    Appointment, AppointmentError, AppointmentListQuery, BookAppointmentRequest,
    UpdateAppointmentRequest,
};
use crate::services::AppointmentService;

fn to_app_error(err: AppointmentError, context: &str) -> AppError {
    match err {
        AppointmentError::NotFound
        | AppointmentError::NotCancellable
        | AppointmentError::DoctorNotFound => AppError::NotFound(err.to_string()),
        AppointmentError::InvalidStatusTransition { .. } => AppError::BadRequest(err.to_string()),
        AppointmentError::StatusChanged => AppError::Conflict(err.to_string()),
        AppointmentError::ValidationError(msg) => AppError::ValidationError(msg),
        AppointmentError::DatabaseError(msg) => AppError::Internal(format!("{}: {}", context, msg)),
    }
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    ApiJson(request): ApiJson<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let service = AppointmentService::new(&state);

    let appointment = service.book_appointment(&user, request).await
        .map_err(|e| to_app_error(e, "Error booking appointment"))?;

    Ok((StatusCode::CREATED, Json(appointment)))
}

#[axum::debug_handler]
pub async fn get_my_appointments(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    ApiQuery(query): ApiQuery<AppointmentListQuery>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let service = AppointmentService::new(&state);

    let appointments = service.list_for_patient(user.id, &query).await
        .map_err(|e| to_app_error(e, "Error fetching appointments"))?;

    Ok(Json(appointments))
}

#[axum::debug_handler]
pub async fn get_doctor_appointments(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    ApiQuery(query): ApiQuery<AppointmentListQuery>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    require_doctor(&user)?;

    let service = AppointmentService::new(&state);

    let appointments = service.list_for_doctor(user.id, &query).await
        .map_err(|e| to_app_error(e, "Error fetching appointments"))?;

    Ok(Json(appointments))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    ApiPath(appointment_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateAppointmentRequest>,
) -> Result<Json<Appointment>, AppError> {
    require_doctor(&user)?;

    let service = AppointmentService::new(&state);

    let appointment = service.update_by_doctor(appointment_id, user.id, request).await
        .map_err(|e| to_app_error(e, "Error updating appointment"))?;

    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn get_all_appointments(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    ApiQuery(query): ApiQuery<AppointmentListQuery>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    require_doctor_or_admin(&user)?;

    let service = AppointmentService::new(&state);

    let appointments = service.list_all(&query).await
        .map_err(|e| to_app_error(e, "Error fetching appointments"))?;

    Ok(Json(appointments))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    ApiPath(appointment_id): ApiPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&state);

    service.cancel_pending(appointment_id, user.id).await
        .map_err(|e| to_app_error(e, "Error cancelling appointment"))?;

    Ok(Json(json!({
        "message": "Appointment cancelled successfully"
    })))
}
