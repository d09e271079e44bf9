use crate::ticker::Ticker;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// BaselineKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineKind {
    /// Previous quarter.
    Qoq,
    /// Same quarter of the previous year.
    Yoy,
}

impl BaselineKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BaselineKind::Qoq => "qoq",
            BaselineKind::Yoy => "yoy",
        }
    }
}

impl fmt::Display for BaselineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BaselineKind {
    type Err = crate::error::EarningsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "qoq" => Ok(BaselineKind::Qoq),
            "yoy" => Ok(BaselineKind::Yoy),
            _ => Err(crate::error::EarningsError::InvalidBaselineKind(
                s.to_string(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Headline figures
// ---------------------------------------------------------------------------

/// Headline figures extracted from a press release.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Headline {
    /// Total revenue for the quarter, in currency units.
    pub revenue: f64,
    pub eps_diluted: f64,
}

/// Stored comparison figures; either metric may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BaselineHeadline {
    #[serde(default)]
    pub revenue: Option<f64>,
    #[serde(default)]
    pub eps_diluted: Option<f64>,
}

impl From<Headline> for BaselineHeadline {
    fn from(h: Headline) -> Self {
        Self {
            revenue: Some(h.revenue),
            eps_diluted: Some(h.eps_diluted),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanySnapshot {
    pub ticker: Ticker,
    pub headline: Headline,
    pub source_path: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DeltaResult {
    pub revenue_yoy_pct: Option<f64>,
    pub revenue_qoq_pct: Option<f64>,
    pub eps_yoy_pct: Option<f64>,
    pub eps_qoq_pct: Option<f64>,
}

// ---------------------------------------------------------------------------
// Ingest request / result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRequest {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestResult {
    pub ticker: Ticker,
    pub source_url: String,
    pub saved_path: Option<PathBuf>,
    pub content_type: Option<String>,
    pub bytes: Option<u64>,
    #[serde(default)]
    pub cached: bool,
}
