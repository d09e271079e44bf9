use crate::error::{EarningsError, Result};
use crate::paths;
use crate::ticker::Ticker;
use crate::types::{BaselineHeadline, BaselineKind, CompanySnapshot, DeltaResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Percent change from `prior` to `current`, rounded half-to-even to two
/// decimals.
///
/// `None` when either side is missing or `prior` is zero.
pub fn pct_change(current: Option<f64>, prior: Option<f64>) -> Option<f64> {
    let (current, prior) = (current?, prior?);
    if prior == 0.0 {
        return None;
    }
    let pct = (current - prior) / prior * 100.0;
    Some((pct * 100.0).round_ties_even() / 100.0)
}

/// YoY and QoQ percent changes for revenue and diluted EPS.
pub fn compute_deltas(
    current: &BaselineHeadline,
    yoy_baseline: Option<&BaselineHeadline>,
    qoq_baseline: Option<&BaselineHeadline>,
) -> DeltaResult {
    let yoy = yoy_baseline.copied().unwrap_or_default();
    let qoq = qoq_baseline.copied().unwrap_or_default();
    DeltaResult {
        revenue_yoy_pct: pct_change(current.revenue, yoy.revenue),
        revenue_qoq_pct: pct_change(current.revenue, qoq.revenue),
        eps_yoy_pct: pct_change(current.eps_diluted, yoy.eps_diluted),
        eps_qoq_pct: pct_change(current.eps_diluted, qoq.eps_diluted),
    }
}

// ---------------------------------------------------------------------------
// Baseline files
// ---------------------------------------------------------------------------

/// On-disk shape of `parsed/{TICKER}/{kind}_baseline.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaselineFile {
    #[serde(default)]
    pub headline: Option<BaselineHeadline>,
}

/// Stored baseline for `ticker`, or `None` if no file exists or it has no
/// `headline` key.
pub fn load_baseline(
    data_dir: &Path,
    ticker: &Ticker,
    kind: BaselineKind,
) -> Result<Option<BaselineHeadline>> {
    let path = paths::baseline_path(data_dir, ticker.as_str(), kind);
    if !path.exists() {
        return Ok(None);
    }
    let data = std::fs::read_to_string(&path)?;
    let file: BaselineFile = serde_json::from_str(&data)?;
    Ok(file.headline)
}

/// Like [`load_baseline`] but a missing baseline is an error.
pub fn require_baseline(
    data_dir: &Path,
    ticker: &Ticker,
    kind: BaselineKind,
) -> Result<BaselineHeadline> {
    load_baseline(data_dir, ticker, kind)?.ok_or_else(|| EarningsError::BaselineNotFound {
        ticker: ticker.to_string(),
        kind: kind.to_string(),
    })
}

pub fn save_baseline(
    data_dir: &Path,
    ticker: &Ticker,
    kind: BaselineKind,
    headline: BaselineHeadline,
) -> Result<PathBuf> {
    let path = paths::baseline_path(data_dir, ticker.as_str(), kind);
    crate::io::write_json(
        &path,
        &BaselineFile {
            headline: Some(headline),
        },
    )?;
    tracing::info!(%ticker, %kind, path = %path.display(), "baseline saved");
    Ok(path)
}

// ---------------------------------------------------------------------------
// DeltaReport
// ---------------------------------------------------------------------------

/// Latest snapshot for a ticker together with its deltas against the stored
/// baselines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaReport {
    pub snapshot: CompanySnapshot,
    pub yoy_baseline: Option<BaselineHeadline>,
    pub qoq_baseline: Option<BaselineHeadline>,
    pub deltas: DeltaResult,
}

pub fn delta_report(data_dir: &Path, ticker: &Ticker) -> Result<DeltaReport> {
    let snapshot = crate::extract::extract_snapshot(data_dir, ticker)?;
    let yoy_baseline = load_baseline(data_dir, ticker, BaselineKind::Yoy)?;
    let qoq_baseline = load_baseline(data_dir, ticker, BaselineKind::Qoq)?;
    let current = BaselineHeadline::from(snapshot.headline);
    let deltas = compute_deltas(&current, yoy_baseline.as_ref(), qoq_baseline.as_ref());
    Ok(DeltaReport {
        snapshot,
        yoy_baseline,
        qoq_baseline,
        deltas,
    })
}
