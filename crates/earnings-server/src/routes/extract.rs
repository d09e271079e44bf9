use axum::extract::{Path, State};
use axum::Json;
use earnings_core::types::CompanySnapshot;
use earnings_core::Ticker;

use crate::error::AppError;
use crate::state::AppState;

/// GET /extract/:ticker — headline figures from the newest HTML document.
pub async fn extract_snapshot(
    State(app): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<CompanySnapshot>, AppError> {
    let ticker = Ticker::parse(&ticker)?;
    let data_dir = app.data_dir();
    let snapshot = tokio::task::spawn_blocking(move || {
        earnings_core::extract::extract_snapshot(&data_dir, &ticker)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(snapshot))
}
