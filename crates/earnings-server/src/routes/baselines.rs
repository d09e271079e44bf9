use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;
use earnings_core::types::{BaselineHeadline, BaselineKind};
use earnings_core::Ticker;

use crate::error::AppError;
use crate::state::AppState;

fn parse_params(ticker: &str, kind: &str) -> Result<(Ticker, BaselineKind), AppError> {
    let ticker = Ticker::parse(ticker)?;
    let kind: BaselineKind = kind.parse()?;
    Ok((ticker, kind))
}

/// GET /baselines/:ticker/:kind — stored comparison figures.
pub async fn get_baseline(
    State(app): State<AppState>,
    Path((ticker, kind)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (ticker, kind) = parse_params(&ticker, &kind)?;
    let data_dir = app.data_dir();
    let result = tokio::task::spawn_blocking(move || {
        let headline = earnings_core::delta::require_baseline(&data_dir, &ticker, kind)?;
        Ok::<_, earnings_core::EarningsError>(serde_json::json!({
            "ticker": ticker,
            "kind": kind,
            "headline": headline,
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// PUT /baselines/:ticker/:kind — replace the stored comparison figures.
pub async fn put_baseline(
    State(app): State<AppState>,
    Path((ticker, kind)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let (ticker, kind) = parse_params(&ticker, &kind)?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::bad_request("Body required"));
    }
    let headline: BaselineHeadline = serde_json::from_slice(&body)
        .map_err(|e| AppError::bad_request(format!("invalid request body: {e}")))?;
    let data_dir = app.data_dir();
    let result = tokio::task::spawn_blocking(move || {
        let path = earnings_core::delta::save_baseline(&data_dir, &ticker, kind, headline)?;
        Ok::<_, earnings_core::EarningsError>(serde_json::json!({
            "ticker": ticker,
            "kind": kind,
            "headline": headline,
            "path": path,
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
