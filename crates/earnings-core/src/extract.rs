use crate::error::{EarningsError, Result};
use crate::paths;
use crate::ticker::Ticker;
use crate::types::{CompanySnapshot, Headline};
use regex::Regex;
use scraper::Html;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static REVENUE_RE: OnceLock<Regex> = OnceLock::new();
static EPS_RE: OnceLock<Regex> = OnceLock::new();

fn revenue_re() -> &'static Regex {
    REVENUE_RE.get_or_init(|| {
        Regex::new(r"(?i)Revenue.*?\$?(\d[\d,]*(?:\.\d+)?)\s*(billion|million)?").unwrap()
    })
}

fn eps_re() -> &'static Regex {
    EPS_RE.get_or_init(|| Regex::new(r"(?i)Diluted EPS.*?\$?(\d[\d,]*(?:\.\d+)?)").unwrap())
}

/// Newest `*.html` document under `raw/{TICKER}/`.
///
/// Saved files carry a `YYYY-MM-DD_` prefix, so the lexically greatest name
/// is the most recent.
pub fn latest_file_for_ticker(data_dir: &Path, ticker: &Ticker) -> Result<PathBuf> {
    let folder = paths::raw_dir(data_dir, ticker.as_str());
    if !folder.is_dir() {
        return Err(EarningsError::NoRawData(ticker.to_string()));
    }
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(&folder)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "html"))
        .collect();
    candidates.sort();
    candidates
        .pop()
        .ok_or_else(|| EarningsError::NoHtmlFiles(ticker.to_string()))
}

/// Visible text of an HTML document: text nodes trimmed and joined by single
/// spaces.
pub fn html_to_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let joined = doc
        .root_element()
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse::<f64>().ok()
}

/// Pull revenue and diluted EPS out of a press release.
pub fn parse_revenue_and_eps(html: &str) -> Result<Headline> {
    let text = html_to_text(html);

    let (Some(rev), Some(eps)) = (revenue_re().captures(&text), eps_re().captures(&text)) else {
        return Err(EarningsError::MissingHeadline);
    };

    let mut revenue = parse_number(&rev[1]).ok_or(EarningsError::MissingHeadline)?;
    match rev.get(2).map(|m| m.as_str().to_ascii_lowercase()) {
        Some(unit) if unit.starts_with('b') => revenue *= 1_000_000_000.0,
        Some(unit) if unit.starts_with('m') => revenue *= 1_000_000.0,
        _ => {}
    }

    let eps_diluted = parse_number(&eps[1]).ok_or(EarningsError::MissingHeadline)?;

    Ok(Headline {
        revenue,
        eps_diluted,
    })
}

/// Extract headline figures from the newest HTML document for `ticker`.
pub fn extract_snapshot(data_dir: &Path, ticker: &Ticker) -> Result<CompanySnapshot> {
    let path = latest_file_for_ticker(data_dir, ticker)?;
    let bytes = std::fs::read(&path)?;
    let html = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(
                file = %path.display(),
                "failed to decode as UTF-8, falling back to lossy decoding"
            );
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };

    let headline = parse_revenue_and_eps(&html)?;
    tracing::debug!(%ticker, revenue = headline.revenue, eps = headline.eps_diluted, "extracted headline");
    Ok(CompanySnapshot {
        ticker: ticker.clone(),
        headline,
        source_path: path,
    })
}

/// Persist `snapshot` as `parsed/{TICKER}/latest.json`.
pub fn save_snapshot(data_dir: &Path, snapshot: &CompanySnapshot) -> Result<PathBuf> {
    let path = paths::latest_snapshot_path(data_dir, snapshot.ticker.as_str());
    crate::io::write_json(&path, snapshot)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MSFT_PRESS: &str = include_str!("../tests/fixtures/msft_press.html");
    const MISSING_EPS: &str = include_str!("../tests/fixtures/missing_eps.html");

    fn seed(dir: &TempDir, ticker: &str, name: &str, body: &[u8]) -> PathBuf {
        let raw = dir.path().join("raw").join(ticker);
        std::fs::create_dir_all(&raw).unwrap();
        let path = raw.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn extract_from_fixture_html() {
        let dir = TempDir::new().unwrap();
        let path = seed(&dir, "MSFT", "2025-01-01_press.html", MSFT_PRESS.as_bytes());

        let snap = extract_snapshot(dir.path(), &Ticker::parse("msft").unwrap()).unwrap();

        assert_eq!(snap.ticker.as_str(), "MSFT");
        assert_eq!(snap.source_path, path);
        assert!((snap.headline.revenue - 62_000_000_000.0).abs() < 1e-6);
        assert!((snap.headline.eps_diluted - 2.94).abs() < 1e-6);
    }

    #[test]
    fn missing_numbers_is_missing_headline() {
        let dir = TempDir::new().unwrap();
        seed(&dir, "AAPL", "2025-01-01_press.html", MISSING_EPS.as_bytes());

        let err = extract_snapshot(dir.path(), &Ticker::parse("AAPL").unwrap()).unwrap_err();
        assert!(matches!(err, EarningsError::MissingHeadline));
        assert!(err.to_string().contains("Missing revenue or EPS"));
    }

    #[test]
    fn no_raw_dir_is_no_raw_data() {
        let dir = TempDir::new().unwrap();
        let err = extract_snapshot(dir.path(), &Ticker::parse("IBM").unwrap()).unwrap_err();
        assert!(matches!(err, EarningsError::NoRawData(ref t) if t == "IBM"));
    }

    #[test]
    fn only_pdfs_is_no_html_files() {
        let dir = TempDir::new().unwrap();
        seed(&dir, "IBM", "2025-01-01_10q.pdf", b"%PDF-1.7");
        let err = latest_file_for_ticker(dir.path(), &Ticker::parse("IBM").unwrap()).unwrap_err();
        assert!(matches!(err, EarningsError::NoHtmlFiles(_)));
    }

    #[test]
    fn latest_file_is_newest_date() {
        let dir = TempDir::new().unwrap();
        seed(&dir, "MSFT", "2024-10-30_press.html", b"old");
        let newest = seed(&dir, "MSFT", "2025-01-29_press.html", b"new");
        seed(&dir, "MSFT", "2025-02-01_deck.pdf", b"%PDF");

        let got = latest_file_for_ticker(dir.path(), &Ticker::parse("MSFT").unwrap()).unwrap();
        assert_eq!(got, newest);
    }

    #[test]
    fn millions_and_thousands_separators() {
        let html = "<p>Total revenue of $1,234.5 million</p><p>Diluted EPS: $0.87 per share</p>";
        let h = parse_revenue_and_eps(html).unwrap();
        assert!((h.revenue - 1_234_500_000.0).abs() < 1e-3);
        assert!((h.eps_diluted - 0.87).abs() < 1e-9);
    }

    #[test]
    fn unscaled_revenue_is_kept_as_is() {
        let html = "<div>REVENUE: 5,000</div><div>diluted eps 1.10 </div>";
        let h = parse_revenue_and_eps(html).unwrap();
        assert_eq!(h.revenue, 5000.0);
        assert_eq!(h.eps_diluted, 1.10);
    }

    #[test]
    fn html_to_text_joins_across_tags() {
        let text = html_to_text("<p>Revenue was <b>$62.0\n billion</b></p><p>Next</p>");
        assert_eq!(text, "Revenue was $62.0 billion Next");
    }

    #[test]
    fn invalid_utf8_falls_back_to_lossy() {
        let dir = TempDir::new().unwrap();
        let mut body = MSFT_PRESS.as_bytes().to_vec();
        body.extend_from_slice(&[0xff, 0xfe, 0xfd]);
        seed(&dir, "MSFT", "2025-01-01_press.html", &body);

        let snap = extract_snapshot(dir.path(), &Ticker::parse("MSFT").unwrap()).unwrap();
        assert!((snap.headline.eps_diluted - 2.94).abs() < 1e-6);
    }

    #[test]
    fn save_snapshot_writes_latest_json() {
        let dir = TempDir::new().unwrap();
        let snap = CompanySnapshot {
            ticker: Ticker::parse("MSFT").unwrap(),
            headline: Headline {
                revenue: 1.0,
                eps_diluted: 2.0,
            },
            source_path: PathBuf::from("raw/MSFT/x.html"),
        };
        let path = save_snapshot(dir.path(), &snap).unwrap();
        assert!(path.ends_with("parsed/MSFT/latest.json"));
        let back: CompanySnapshot =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(back, snap);
    }
}
