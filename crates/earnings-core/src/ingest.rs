use crate::config::{Config, IngestConfig};
use crate::error::{EarningsError, Result};
use crate::index::{self, IndexEntry};
use crate::paths;
use crate::ticker::Ticker;
use crate::types::IngestResult;
use chrono::{NaiveDate, Utc};
use reqwest::blocking::{Client, Response};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{StatusCode, Url};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;

pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

const CHUNK_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// URL and save-path helpers
// ---------------------------------------------------------------------------

/// Parse an absolute `http`/`https` URL.
pub fn parse_http_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|_| EarningsError::InvalidUrl(raw.to_string()))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(EarningsError::InvalidUrl(raw.to_string())),
    }
}

fn ext_from_content_type(content_type: &str) -> &'static str {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    match mime.as_str() {
        "text/html" => ".html",
        "application/pdf" => ".pdf",
        _ => ".bin",
    }
}

fn ext_from_url(url: &Url) -> &'static str {
    let path = url.path().to_ascii_lowercase();
    if path.ends_with(".pdf") {
        ".pdf"
    } else if path.ends_with(".html") || path.ends_with(".htm") {
        ".html"
    } else {
        ".bin"
    }
}

fn url_basename(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segs| segs.rfind(|s| !s.is_empty()))
        .map(str::to_string)
        .unwrap_or_else(|| "download".to_string())
}

/// Where a document for `ticker` fetched from `url` on `today` is stored:
/// `raw/{TICKER}/{YYYY-MM-DD}_{basename}{ext}`.
///
/// The extension comes from `content_type` when known, otherwise from the URL.
pub fn save_path_for(
    data_dir: &Path,
    ticker: &Ticker,
    url: &Url,
    content_type: Option<&str>,
    today: NaiveDate,
) -> PathBuf {
    let ext = match content_type {
        Some(ct) if !ct.trim().is_empty() => ext_from_content_type(ct),
        _ => ext_from_url(url),
    };
    let mut basename = url_basename(url);
    if !basename.ends_with(ext) {
        basename.push_str(ext);
    }
    paths::raw_dir(data_dir, ticker.as_str()).join(format!(
        "{}_{}",
        today.format("%Y-%m-%d"),
        basename
    ))
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// The path a fetch started now would write to, before the response
/// content type is known. No I/O.
pub fn preview_save_path(data_dir: &Path, ticker: &Ticker, url: &Url) -> PathBuf {
    save_path_for(data_dir, ticker, url, None, today())
}

// ---------------------------------------------------------------------------
// IngestOutcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct IngestOutcome {
    pub saved_path: PathBuf,
    pub content_type: String,
    pub bytes: u64,
    /// Served from the idempotency index without a download.
    pub cached: bool,
}

impl IngestOutcome {
    pub fn into_result(self, ticker: Ticker, source_url: &Url) -> IngestResult {
        IngestResult {
            ticker,
            source_url: source_url.to_string(),
            saved_path: Some(self.saved_path),
            content_type: Some(self.content_type),
            bytes: Some(self.bytes),
            cached: self.cached,
        }
    }
}

/// Result of the best-effort HEAD probe.
#[derive(Debug, Default)]
struct HeadInfo {
    content_type: Option<String>,
    content_length: Option<u64>,
}

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

/// Downloads documents into the data directory.
///
/// Uses a blocking client; async callers must run it on a blocking thread.
pub struct Fetcher {
    client: Client,
    ingest: IngestConfig,
    data_dir: PathBuf,
}

impl Fetcher {
    pub fn new(config: &Config, root: &Path) -> Result<Self> {
        Self::with_data_dir(config.ingest.clone(), config.data_dir(root))
    }

    pub fn with_data_dir(ingest: IngestConfig, data_dir: PathBuf) -> Result<Self> {
        let client = Client::builder()
            .user_agent(ingest.user_agent.clone())
            .connect_timeout(ingest.connect_timeout())
            .timeout(ingest.read_timeout())
            .pool_idle_timeout(ingest.pool_timeout())
            .build()?;
        Ok(Self {
            client,
            ingest,
            data_dir,
        })
    }

    /// Download `url` for `ticker` into `raw/{TICKER}/`, enforcing the size
    /// limit and content-type allow-list.
    ///
    /// A repeat request inside the idempotency TTL returns the earlier file
    /// without touching the network. An unsupported content type keeps the
    /// bytes on disk but is reported as [`EarningsError::UnsupportedType`].
    pub fn fetch_to_disk(&self, ticker: &Ticker, url: &Url) -> Result<IngestOutcome> {
        let ttl = self.ingest.idempotency_ttl_secs;
        if let Some(hit) = index::lookup(&self.data_dir, ticker, url.as_str(), ttl, Utc::now())? {
            tracing::info!(%ticker, %url, path = %hit.saved_path.display(), "ingest served from index");
            return Ok(IngestOutcome {
                saved_path: hit.saved_path,
                content_type: hit.content_type,
                bytes: hit.bytes,
                cached: true,
            });
        }

        let head = self.probe(url);
        if let Some(len) = head.content_length {
            if len > self.ingest.max_bytes {
                return Err(EarningsError::TooLarge(format!(
                    "Content-Length {len} exceeds limit {}",
                    self.ingest.max_bytes
                )));
            }
        }

        let mut resp = self.get_with_retry(url)?;
        if let Some(len) = resp.content_length() {
            if len > self.ingest.max_bytes {
                return Err(EarningsError::TooLarge(format!(
                    "Content-Length {len} exceeds limit {}",
                    self.ingest.max_bytes
                )));
            }
        }

        let content_type = header_str(&resp, CONTENT_TYPE).or(head.content_type);
        let save_path = save_path_for(
            &self.data_dir,
            ticker,
            url,
            content_type.as_deref(),
            today(),
        );
        let bytes = self.stream_to_file(&mut resp, &save_path)?;
        tracing::info!(%ticker, %url, path = %save_path.display(), bytes, "document saved");

        if let Some(ct) = &content_type {
            if !self.ingest.is_allowed(ct) {
                tracing::warn!(%ticker, content_type = %ct, "content type not in allow-list; bytes kept");
                return Err(EarningsError::UnsupportedType(ct.clone()));
            }
        }

        let content_type = content_type.unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());
        index::record(
            &self.data_dir,
            ticker,
            url.as_str(),
            IndexEntry {
                saved_path: save_path.clone(),
                content_type: content_type.clone(),
                bytes,
                fetched_at: Utc::now(),
            },
            ttl,
        )?;

        Ok(IngestOutcome {
            saved_path: save_path,
            content_type,
            bytes,
            cached: false,
        })
    }

    /// HEAD the URL to learn size and type early. Some origins reject HEAD,
    /// so every failure is swallowed.
    fn probe(&self, url: &Url) -> HeadInfo {
        match self.client.head(url.clone()).send() {
            Ok(resp) if resp.status().as_u16() < 400 => HeadInfo {
                content_type: header_str(&resp, CONTENT_TYPE),
                content_length: header_str(&resp, CONTENT_LENGTH)
                    .and_then(|v| v.trim().parse::<u64>().ok()),
            },
            Ok(resp) => {
                tracing::debug!(%url, status = %resp.status(), "HEAD rejected; continuing with GET");
                HeadInfo::default()
            }
            Err(e) => {
                tracing::debug!(%url, error = %e, "HEAD failed; continuing with GET");
                HeadInfo::default()
            }
        }
    }

    fn get_with_retry(&self, url: &Url) -> Result<Response> {
        let mut attempt: u32 = 0;
        loop {
            let can_retry = attempt < self.ingest.max_retries;
            match self.client.get(url.clone()).send() {
                Ok(resp) if resp.status().is_success() => return Ok(resp),
                Ok(resp) => {
                    let status = resp.status();
                    if can_retry && is_retryable_status(status) {
                        tracing::warn!(%url, %status, attempt, "transient upstream status; retrying");
                    } else {
                        return Err(EarningsError::UpstreamStatus {
                            status: status.as_u16(),
                            url: url.to_string(),
                        });
                    }
                }
                Err(e) => {
                    if can_retry && (e.is_connect() || e.is_timeout()) {
                        tracing::warn!(%url, error = %e, attempt, "request failed; retrying");
                    } else {
                        return Err(e.into());
                    }
                }
            }
            std::thread::sleep(self.backoff(attempt));
            attempt += 1;
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.min(16);
        Duration::from_millis(self.ingest.retry_backoff_ms.saturating_mul(factor))
    }

    /// Copy the body into a tempfile next to `save_path` and move it into
    /// place only once the whole body fits under the limit.
    fn stream_to_file(&self, resp: &mut Response, save_path: &Path) -> Result<u64> {
        let folder = save_path.parent().unwrap_or(&self.data_dir);
        crate::io::ensure_dir(folder)?;
        let mut tmp = NamedTempFile::new_in(folder)?;

        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut written: u64 = 0;
        loop {
            let n = resp.read(&mut buf)?;
            if n == 0 {
                break;
            }
            written += n as u64;
            if written > self.ingest.max_bytes {
                return Err(EarningsError::TooLarge(format!(
                    "Downloaded > {} bytes",
                    self.ingest.max_bytes
                )));
            }
            tmp.write_all(&buf[..n])?;
        }
        tmp.flush()?;
        tmp.persist(save_path).map_err(|e| e.error)?;
        Ok(written)
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn header_str(resp: &Response, name: reqwest::header::HeaderName) -> Option<String> {
    resp.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .filter(|s| !s.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
