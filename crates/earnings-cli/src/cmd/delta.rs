use crate::output::{fmt_opt, fmt_pct, print_json, print_table};
use anyhow::Result;
use earnings_core::Ticker;
use std::path::Path;

pub fn run(root: &Path, ticker: &str, json: bool) -> Result<()> {
    let config = super::load_config(root)?;
    let ticker = Ticker::parse(ticker)?;
    let report = earnings_core::delta::delta_report(&config.data_dir(root), &ticker)?;

    if json {
        return print_json(&report);
    }

    let yoy = report.yoy_baseline.unwrap_or_default();
    let qoq = report.qoq_baseline.unwrap_or_default();
    let h = report.snapshot.headline;
    let d = report.deltas;

    println!("{}  {}", report.snapshot.ticker, report.snapshot.source_path.display());
    print_table(
        &["METRIC", "CURRENT", "YOY BASE", "YOY", "QOQ BASE", "QOQ"],
        vec![
            vec![
                "revenue".to_string(),
                fmt_opt(Some(h.revenue)),
                fmt_opt(yoy.revenue),
                fmt_pct(d.revenue_yoy_pct),
                fmt_opt(qoq.revenue),
                fmt_pct(d.revenue_qoq_pct),
            ],
            vec![
                "eps_diluted".to_string(),
                fmt_opt(Some(h.eps_diluted)),
                fmt_opt(yoy.eps_diluted),
                fmt_pct(d.eps_yoy_pct),
                fmt_opt(qoq.eps_diluted),
                fmt_pct(d.eps_qoq_pct),
            ],
        ],
    );
    Ok(())
}
