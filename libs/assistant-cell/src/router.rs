// libs/assistant-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn assistant_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        .route("/greeting", get(handlers::greeting))
        .route("/chat", post(handlers::chat))
        .route("/common-symptoms", get(handlers::common_symptoms))
        .route("/medicine-recommendations", post(handlers::medicine_recommendations))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
