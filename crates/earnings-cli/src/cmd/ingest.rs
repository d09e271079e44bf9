use crate::output::print_json;
use anyhow::Result;
use earnings_core::ingest::{self, Fetcher};
use earnings_core::types::IngestResult;
use earnings_core::Ticker;
use std::path::Path;

pub fn run(root: &Path, ticker: &str, url: &str, preview: bool, json: bool) -> Result<()> {
    let config = super::load_config(root)?;
    let ticker = Ticker::parse(ticker)?;
    let url = ingest::parse_http_url(url)?;

    let result = if preview {
        IngestResult {
            saved_path: Some(ingest::preview_save_path(
                &config.data_dir(root),
                &ticker,
                &url,
            )),
            ticker,
            source_url: url.to_string(),
            content_type: None,
            bytes: None,
            cached: false,
        }
    } else {
        let fetcher = Fetcher::new(&config, root)?;
        fetcher
            .fetch_to_disk(&ticker, &url)?
            .into_result(ticker, &url)
    };

    if json {
        return print_json(&result);
    }

    let path = result
        .saved_path
        .as_deref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    if preview {
        println!("would save {} → {path}", result.source_url);
    } else {
        let bytes = result.bytes.unwrap_or(0);
        let ct = result.content_type.as_deref().unwrap_or("-");
        let note = if result.cached { " (cached)" } else { "" };
        println!("saved {path} ({bytes} bytes, {ct}){note}");
    }
    Ok(())
}
