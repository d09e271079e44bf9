use crate::output::{fmt_figure, print_json};
use anyhow::Result;
use earnings_core::Ticker;
use std::path::Path;

pub fn run(root: &Path, ticker: &str, save: bool, json: bool) -> Result<()> {
    let config = super::load_config(root)?;
    let data_dir = config.data_dir(root);
    let ticker = Ticker::parse(ticker)?;

    let snapshot = earnings_core::extract::extract_snapshot(&data_dir, &ticker)?;
    let saved = if save {
        Some(earnings_core::extract::save_snapshot(&data_dir, &snapshot)?)
    } else {
        None
    };

    if json {
        return print_json(&snapshot);
    }

    println!("{}  {}", snapshot.ticker, snapshot.source_path.display());
    println!("  revenue      {}", fmt_figure(snapshot.headline.revenue));
    println!("  diluted EPS  {}", snapshot.headline.eps_diluted);
    if let Some(path) = saved {
        println!("snapshot written to {}", path.display());
    }
    Ok(())
}
