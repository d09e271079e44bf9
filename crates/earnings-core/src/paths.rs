use crate::types::BaselineKind;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "earnings.yaml";

pub const RAW_DIR: &str = "raw";
pub const PARSED_DIR: &str = "parsed";
pub const INDEX_FILE: &str = ".ingest_index.json";
pub const LATEST_SNAPSHOT: &str = "latest.json";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// `data_dir` is taken as-is when absolute, otherwise relative to `root`.
pub fn resolve_data_dir(root: &Path, data_dir: &Path) -> PathBuf {
    if data_dir.is_absolute() {
        data_dir.to_path_buf()
    } else {
        root.join(data_dir)
    }
}

pub fn raw_dir(data_dir: &Path, ticker: &str) -> PathBuf {
    data_dir.join(RAW_DIR).join(ticker)
}

pub fn parsed_dir(data_dir: &Path, ticker: &str) -> PathBuf {
    data_dir.join(PARSED_DIR).join(ticker)
}

pub fn baseline_path(data_dir: &Path, ticker: &str, kind: BaselineKind) -> PathBuf {
    parsed_dir(data_dir, ticker).join(format!("{}_baseline.json", kind.as_str()))
}

pub fn latest_snapshot_path(data_dir: &Path, ticker: &str) -> PathBuf {
    parsed_dir(data_dir, ticker).join(LATEST_SNAPSHOT)
}

pub fn index_path(data_dir: &Path) -> PathBuf {
    data_dir.join(INDEX_FILE)
}
