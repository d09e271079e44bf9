use axum::extract::{Path, State};
use axum::Json;
use earnings_core::delta::DeltaReport;
use earnings_core::Ticker;

use crate::error::AppError;
use crate::state::AppState;

/// GET /delta/:ticker — latest snapshot with YoY/QoQ changes against the
/// stored baselines.
pub async fn get_delta(
    State(app): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<DeltaReport>, AppError> {
    let ticker = Ticker::parse(&ticker)?;
    let data_dir = app.data_dir();
    let report = tokio::task::spawn_blocking(move || {
        earnings_core::delta::delta_report(&data_dir, &ticker)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(report))
}
