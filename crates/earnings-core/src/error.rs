use thiserror::Error;

#[derive(Debug, Error)]
pub enum EarningsError {
    #[error("invalid ticker '{0}': must be 1-8 characters of A-Z, 0-9, '-' or '.'")]
    InvalidTicker(String),

    #[error("invalid url '{0}': must be an absolute http or https URL")]
    InvalidUrl(String),

    #[error("invalid baseline kind '{0}': expected 'qoq' or 'yoy'")]
    InvalidBaselineKind(String),

    #[error("No raw data for {0}")]
    NoRawData(String),

    #[error("No HTML files found for {0}")]
    NoHtmlFiles(String),

    #[error("no {kind} baseline stored for {ticker}")]
    BaselineNotFound { ticker: String, kind: String },

    #[error("Missing revenue or EPS")]
    MissingHeadline,

    #[error("{0}")]
    TooLarge(String),

    #[error("unsupported content type: {0}")]
    UnsupportedType(String),

    #[error("upstream returned HTTP {status} for {url}")]
    UpstreamStatus { status: u16, url: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EarningsError>;
