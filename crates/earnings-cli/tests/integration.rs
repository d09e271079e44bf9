#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const ENV_OVERRIDES: &[&str] = &[
    "DATA_DIR",
    "USER_AGENT",
    "INGEST_ALLOWED_TYPES",
    "INGEST_MAX_BYTES",
    "INGEST_IDEMPOTENCY_TTL_SECONDS",
    "EARNINGS_HOST",
    "EARNINGS_PORT",
];

fn earnings(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("earnings").unwrap();
    cmd.current_dir(dir.path()).env("EARNINGS_ROOT", dir.path());
    for var in ENV_OVERRIDES {
        cmd.env_remove(var);
    }
    cmd
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../earnings-core/tests/fixtures")
        .join(name)
}

fn seed_press_release(dir: &TempDir) {
    let raw = dir.path().join("data/raw/MSFT");
    std::fs::create_dir_all(&raw).unwrap();
    std::fs::copy(fixture("msft_press.html"), raw.join("2025-01-29_press.html")).unwrap();
}

fn seed_baselines(dir: &TempDir) {
    let parsed = dir.path().join("data/parsed/MSFT");
    std::fs::create_dir_all(&parsed).unwrap();
    std::fs::copy(
        fixture("sample_last_year.json"),
        parsed.join("yoy_baseline.json"),
    )
    .unwrap();
    std::fs::copy(
        fixture("sample_last_quarter.json"),
        parsed.join("qoq_baseline.json"),
    )
    .unwrap();
}

fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let out = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&out).unwrap()
}

// ---------------------------------------------------------------------------
// earnings config
// ---------------------------------------------------------------------------

#[test]
fn config_show_uses_defaults_without_file() {
    let dir = TempDir::new().unwrap();
    let json = stdout_json(earnings(&dir).args(["--json", "config", "show"]));
    assert_eq!(json["data_dir"], "data");
    assert_eq!(json["server"]["port"], 8000);
    assert_eq!(json["ingest"]["max_bytes"], 20 * 1024 * 1024);
}

#[test]
fn config_show_applies_env_overrides() {
    let dir = TempDir::new().unwrap();
    let json = stdout_json(
        earnings(&dir)
            .env("DATA_DIR", "elsewhere")
            .env("EARNINGS_PORT", "9100")
            .args(["--json", "config", "show"]),
    );
    assert_eq!(json["data_dir"], "elsewhere");
    assert_eq!(json["server"]["port"], 9100);
}

#[test]
fn config_init_writes_file_once() {
    let dir = TempDir::new().unwrap();
    earnings(&dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote"));
    assert!(dir.path().join("earnings.yaml").is_file());

    earnings(&dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn config_validate_fails_on_zero_max_bytes() {
    let dir = TempDir::new().unwrap();
    earnings(&dir)
        .env("INGEST_MAX_BYTES", "0")
        .args(["config", "validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config has errors"));
}

#[test]
fn config_validate_ok_by_default() {
    let dir = TempDir::new().unwrap();
    earnings(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config ok"));
}

// ---------------------------------------------------------------------------
// earnings ingest
// ---------------------------------------------------------------------------

#[test]
fn ingest_preview_reports_target_path() {
    let dir = TempDir::new().unwrap();
    let json = stdout_json(earnings(&dir).args([
        "--json",
        "ingest",
        "msft",
        "https://example.com/press/q3.html",
        "--preview",
    ]));
    assert_eq!(json["ticker"], "MSFT");
    let saved = json["saved_path"].as_str().unwrap();
    assert!(saved.contains("raw/MSFT/"), "{saved}");
    assert!(saved.ends_with("_q3.html"), "{saved}");
    assert!(!dir.path().join("data/raw/MSFT").exists());
}

#[test]
fn ingest_rejects_invalid_ticker() {
    let dir = TempDir::new().unwrap();
    earnings(&dir)
        .args(["ingest", "../etc", "https://example.com/a.html", "--preview"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn ingest_rejects_non_http_url() {
    let dir = TempDir::new().unwrap();
    earnings(&dir)
        .args(["ingest", "MSFT", "ftp://example.com/a.html", "--preview"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid url"));
}

// ---------------------------------------------------------------------------
// earnings extract
// ---------------------------------------------------------------------------

#[test]
fn extract_reads_newest_html() {
    let dir = TempDir::new().unwrap();
    seed_press_release(&dir);
    let json = stdout_json(earnings(&dir).args(["--json", "extract", "msft"]));
    assert_eq!(json["ticker"], "MSFT");
    assert_eq!(json["headline"]["revenue"], 62_000_000_000.0);
    assert_eq!(json["headline"]["eps_diluted"], 2.94);
    assert!(!dir.path().join("data/parsed/MSFT/latest.json").exists());
}

#[test]
fn extract_save_writes_snapshot() {
    let dir = TempDir::new().unwrap();
    seed_press_release(&dir);
    earnings(&dir)
        .args(["extract", "MSFT", "--save"])
        .assert()
        .success()
        .stdout(predicate::str::contains("snapshot written"));
    assert!(dir.path().join("data/parsed/MSFT/latest.json").is_file());
}

#[test]
fn extract_without_raw_data_fails() {
    let dir = TempDir::new().unwrap();
    earnings(&dir)
        .args(["extract", "MSFT"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No raw data for MSFT"));
}

// ---------------------------------------------------------------------------
// earnings delta / baseline
// ---------------------------------------------------------------------------

#[test]
fn delta_computes_changes_against_baselines() {
    let dir = TempDir::new().unwrap();
    seed_press_release(&dir);
    seed_baselines(&dir);
    let json = stdout_json(earnings(&dir).args(["--json", "delta", "MSFT"]));
    assert_eq!(json["deltas"]["revenue_yoy_pct"], 14.81);
    assert_eq!(json["deltas"]["revenue_qoq_pct"], 7.83);
    assert_eq!(json["deltas"]["eps_yoy_pct"], 22.5);
    assert_eq!(json["deltas"]["eps_qoq_pct"], 6.91);
}

#[test]
fn delta_table_output_shows_metrics() {
    let dir = TempDir::new().unwrap();
    seed_press_release(&dir);
    seed_baselines(&dir);
    earnings(&dir)
        .args(["delta", "MSFT"])
        .assert()
        .success()
        .stdout(predicate::str::contains("revenue"))
        .stdout(predicate::str::contains("+14.81%"));
}

#[test]
fn baseline_set_then_show() {
    let dir = TempDir::new().unwrap();
    earnings(&dir)
        .args(["baseline", "set", "MSFT", "YOY", "--revenue", "54000000000", "--eps", "2.4"])
        .assert()
        .success();
    assert!(dir.path().join("data/parsed/MSFT/yoy_baseline.json").is_file());

    let json = stdout_json(earnings(&dir).args(["--json", "baseline", "show", "MSFT", "yoy"]));
    assert_eq!(json["headline"]["revenue"], 54_000_000_000.0);
    assert_eq!(json["headline"]["eps_diluted"], 2.4);
}

#[test]
fn baseline_set_requires_a_figure() {
    let dir = TempDir::new().unwrap();
    earnings(&dir)
        .args(["baseline", "set", "MSFT", "qoq"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to store"));
}

#[test]
fn baseline_rejects_unknown_kind() {
    let dir = TempDir::new().unwrap();
    earnings(&dir)
        .args(["baseline", "set", "MSFT", "annual", "--eps", "1.0"])
        .assert()
        .failure();
}

#[test]
fn baseline_promote_copies_latest_extraction() {
    let dir = TempDir::new().unwrap();
    seed_press_release(&dir);
    earnings(&dir)
        .args(["baseline", "promote", "MSFT", "qoq"])
        .assert()
        .success();

    let json = stdout_json(earnings(&dir).args(["--json", "baseline", "show", "MSFT", "qoq"]));
    assert_eq!(json["headline"]["eps_diluted"], 2.94);
}

#[test]
fn baseline_show_missing_fails() {
    let dir = TempDir::new().unwrap();
    earnings(&dir)
        .args(["baseline", "show", "MSFT", "qoq"])
        .assert()
        .failure();
}
