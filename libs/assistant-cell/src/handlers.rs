// libs/assistant-cell/src/handlers.rs
use axum::{extract::Extension, Json};

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extract::ApiJson;

use crate::models::{
    AssistantError, ChatMessage, ChatRequest, MedicineRecommendation, RecommendationRequest,
};
use crate::services::AssistantService;

impl From<AssistantError> for AppError {
    fn from(err: AssistantError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

pub async fn greeting(Extension(user): Extension<User>) -> Json<ChatMessage> {
    Json(AssistantService::new().greeting(&user))
}

#[axum::debug_handler]
pub async fn chat(
    Extension(_user): Extension<User>,
    ApiJson(request): ApiJson<ChatRequest>,
) -> Result<Json<ChatMessage>, AppError> {
    let reply = AssistantService::new().reply(&request.message)?;
    Ok(Json(reply))
}

pub async fn common_symptoms() -> Json<Vec<String>> {
    Json(AssistantService::new().common_symptoms())
}

#[axum::debug_handler]
pub async fn medicine_recommendations(
    Extension(_user): Extension<User>,
    ApiJson(request): ApiJson<RecommendationRequest>,
) -> Result<Json<MedicineRecommendation>, AppError> {
    let recommendation = AssistantService::new().recommend(request.symptoms)?;
    Ok(Json(recommendation))
}
