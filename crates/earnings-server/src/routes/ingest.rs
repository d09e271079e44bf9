use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::Json;
use earnings_core::ingest::{self, Fetcher};
use earnings_core::types::{IngestRequest, IngestResult};
use earnings_core::Ticker;
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct IngestQuery {
    /// Report where the document would be saved without downloading it.
    #[serde(default)]
    pub preview: bool,
}

/// POST /ingest/:ticker — download `{ "url": ... }` into the raw store.
pub async fn ingest_document(
    State(app): State<AppState>,
    Path(ticker): Path<String>,
    Query(query): Query<IngestQuery>,
    body: Bytes,
) -> Result<Json<IngestResult>, AppError> {
    let ticker = Ticker::parse(&ticker)?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::bad_request("Body required"));
    }
    let req: IngestRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::bad_request(format!("invalid request body: {e}")))?;
    let url = ingest::parse_http_url(&req.url)?;

    if query.preview {
        let saved_path = ingest::preview_save_path(&app.data_dir(), &ticker, &url);
        return Ok(Json(IngestResult {
            ticker,
            source_url: url.to_string(),
            saved_path: Some(saved_path),
            content_type: None,
            bytes: None,
            cached: false,
        }));
    }

    let config = app.config.clone();
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let fetcher = Fetcher::new(&config, &root)?;
        let outcome = fetcher.fetch_to_disk(&ticker, &url)?;
        Ok::<_, earnings_core::EarningsError>(outcome.into_result(ticker, &url))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
