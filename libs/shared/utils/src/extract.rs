//! Drop-in replacements for axum's `Json`, `Path` and `Query` extractors
//! whose rejections go through `AppError`, so malformed input gets the same
//! `{"message"}` body as every other failure.

use axum::extract::{FromRequest, FromRequestParts};

use shared_models::error::AppError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);
