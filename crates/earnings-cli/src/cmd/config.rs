use crate::output::{print_json, print_table};
use anyhow::{bail, Context, Result};
use clap::Subcommand;
use earnings_core::config::{Config, WarnLevel};
use earnings_core::paths;
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective configuration (file + environment)
    Show,

    /// Write a default earnings.yaml if none exists
    Init,

    /// Validate the config for common mistakes
    Validate,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(root, json),
        ConfigSubcommand::Init => init(root, json),
        ConfigSubcommand::Validate => validate(root, json),
    }
}

fn show(root: &Path, json: bool) -> Result<()> {
    let config = super::load_config(root)?;
    if json {
        return print_json(&config);
    }
    print!("{}", serde_yaml::to_string(&config).context("rendering config")?);
    Ok(())
}

fn init(root: &Path, json: bool) -> Result<()> {
    let path = paths::config_path(root);
    let created = if path.exists() {
        false
    } else {
        Config::default().save(root)?;
        true
    };
    if json {
        return print_json(&serde_json::json!({ "path": path, "created": created }));
    }
    if created {
        println!("wrote {}", path.display());
    } else {
        println!("{} already exists", path.display());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(root: &Path, json: bool) -> Result<()> {
    let config = super::load_config(root)?;
    let warnings = config.validate();
    let has_errors = warnings.iter().any(|w| w.level == WarnLevel::Error);

    if json {
        print_json(&serde_json::json!({ "ok": !has_errors, "warnings": warnings }))?;
    } else if warnings.is_empty() {
        println!("config ok");
    } else {
        let rows = warnings
            .iter()
            .map(|w| {
                let level = match w.level {
                    WarnLevel::Warning => "warning",
                    WarnLevel::Error => "error",
                };
                vec![level.to_string(), w.message.clone()]
            })
            .collect();
        print_table(&["LEVEL", "MESSAGE"], rows);
    }

    if has_errors {
        bail!("config has errors");
    }
    Ok(())
}
