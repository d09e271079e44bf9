pub mod baselines;
pub mod config;
pub mod delta;
pub mod extract;
pub mod health;
pub mod ingest;

use crate::error::AppError;
use axum::http::Uri;

/// Fallback for unknown paths.
pub async fn not_found(uri: Uri) -> AppError {
    AppError::not_found(format!("no route for {}", uri.path()))
}
