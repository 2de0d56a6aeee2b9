// ABOUTME: API module containing the HTTP handler functions for the travel-cms REST API.
// ABOUTME: One generic set of record handlers serves every record kind.

pub mod records;

use axum::extract::FromRequest;

use crate::error::ApiError;

/// `axum::Json` whose rejections render as `{"error": ...}` like every other
/// API error.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);
