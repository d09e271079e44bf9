use crate::output::{fmt_opt, print_json};
use anyhow::{bail, Result};
use clap::Subcommand;
use earnings_core::delta;
use earnings_core::types::{BaselineHeadline, BaselineKind};
use earnings_core::Ticker;
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand definition
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum BaselineSubcommand {
    /// Show the stored baseline
    Show {
        ticker: String,
        /// qoq or yoy
        kind: String,
    },

    /// Store baseline figures given on the command line
    Set {
        ticker: String,
        /// qoq or yoy
        kind: String,
        #[arg(long)]
        revenue: Option<f64>,
        #[arg(long = "eps")]
        eps_diluted: Option<f64>,
    },

    /// Store the figures extracted from the newest document as a baseline
    Promote {
        ticker: String,
        /// qoq or yoy
        kind: String,
    },
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcommand: BaselineSubcommand, json: bool) -> Result<()> {
    let config = super::load_config(root)?;
    let data_dir = config.data_dir(root);

    let (ticker, kind, headline) = match subcommand {
        BaselineSubcommand::Show { ticker, kind } => {
            let (ticker, kind) = parse(&ticker, &kind)?;
            let headline = delta::require_baseline(&data_dir, &ticker, kind)?;
            return show(&ticker, kind, &headline, json);
        }
        BaselineSubcommand::Set {
            ticker,
            kind,
            revenue,
            eps_diluted,
        } => {
            if revenue.is_none() && eps_diluted.is_none() {
                bail!("nothing to store: pass --revenue and/or --eps");
            }
            let (ticker, kind) = parse(&ticker, &kind)?;
            let headline = BaselineHeadline {
                revenue,
                eps_diluted,
            };
            (ticker, kind, headline)
        }
        BaselineSubcommand::Promote { ticker, kind } => {
            let (ticker, kind) = parse(&ticker, &kind)?;
            let snapshot = earnings_core::extract::extract_snapshot(&data_dir, &ticker)?;
            (ticker, kind, BaselineHeadline::from(snapshot.headline))
        }
    };

    let path = delta::save_baseline(&data_dir, &ticker, kind, headline)?;
    if json {
        return print_json(&serde_json::json!({
            "ticker": ticker,
            "kind": kind,
            "headline": headline,
            "path": path,
        }));
    }
    println!("stored {kind} baseline for {ticker} → {}", path.display());
    Ok(())
}

fn parse(ticker: &str, kind: &str) -> Result<(Ticker, BaselineKind)> {
    Ok((Ticker::parse(ticker)?, kind.parse()?))
}

fn show(ticker: &Ticker, kind: BaselineKind, headline: &BaselineHeadline, json: bool) -> Result<()> {
    if json {
        return print_json(&serde_json::json!({
            "ticker": ticker,
            "kind": kind,
            "headline": headline,
        }));
    }
    println!("{ticker} {kind} baseline");
    println!("  revenue      {}", fmt_opt(headline.revenue));
    println!("  diluted EPS  {}", fmt_opt(headline.eps_diluted));
    Ok(())
}
