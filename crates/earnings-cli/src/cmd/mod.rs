pub mod baseline;
pub mod config;
pub mod delta;
pub mod extract;
pub mod ingest;
pub mod serve;

use anyhow::Context;
use earnings_core::config::Config;
use std::path::Path;

/// Load the effective config for `root`.
pub fn load_config(root: &Path) -> anyhow::Result<Config> {
    Config::load(root).with_context(|| format!("loading config under {}", root.display()))
}
