use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;

/// GET /config — effective configuration (file + environment) as JSON.
///
/// Read-only; the server never rewrites `earnings.yaml`.
pub async fn get_config(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let json = serde_json::to_value(&*app.config)?;
    Ok(Json(json))
}
