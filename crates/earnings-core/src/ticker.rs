use crate::error::{EarningsError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

pub const MAX_TICKER_LEN: usize = 8;

static TICKER_RE: OnceLock<Regex> = OnceLock::new();

fn ticker_re() -> &'static Regex {
    TICKER_RE.get_or_init(|| Regex::new(r"^[A-Z0-9\-\.]+$").unwrap())
}

/// An upper-cased exchange symbol, safe to use as a single path component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    pub fn parse(raw: &str) -> Result<Self> {
        let upper = raw.trim().to_ascii_uppercase();
        if upper.is_empty()
            || upper.len() > MAX_TICKER_LEN
            || !ticker_re().is_match(&upper)
            || !upper.chars().any(|c| c.is_ascii_alphanumeric())
        {
            return Err(EarningsError::InvalidTicker(raw.to_string()));
        }
        Ok(Self(upper))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Ticker {
    type Err = EarningsError;

    fn from_str(s: &str) -> Result<Self> {
        Ticker::parse(s)
    }
}

impl TryFrom<String> for Ticker {
    type Error = EarningsError;

    fn try_from(s: String) -> Result<Self> {
        Ticker::parse(&s)
    }
}

impl From<Ticker> for String {
    fn from(t: Ticker) -> String {
        t.0
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
