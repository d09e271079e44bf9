use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// IngestConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: f64,
    /// Deadline for a whole request, body included. The blocking client has
    /// no per-read timeout, so this bounds the full download.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: f64,
    #[serde(default = "default_pool_timeout")]
    pub pool_timeout_secs: f64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_allowed_content_types")]
    pub allowed_content_types: Vec<String>,
    #[serde(default = "default_idempotency_ttl")]
    pub idempotency_ttl_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
}

fn default_max_bytes() -> u64 {
    20 * 1024 * 1024
}

fn default_connect_timeout() -> f64 {
    5.0
}

fn default_read_timeout() -> f64 {
    25.0
}

fn default_pool_timeout() -> f64 {
    5.0
}

fn default_user_agent() -> String {
    "earnings-agent (+contact@example.com)".to_string()
}

fn default_allowed_content_types() -> Vec<String> {
    vec!["text/html".to_string(), "application/pdf".to_string()]
}

fn default_idempotency_ttl() -> u64 {
    600
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff() -> u64 {
    250
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
            pool_timeout_secs: default_pool_timeout(),
            user_agent: default_user_agent(),
            allowed_content_types: default_allowed_content_types(),
            idempotency_ttl_secs: default_idempotency_ttl(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff(),
        }
    }
}

impl IngestConfig {
    pub fn connect_timeout(&self) -> Duration {
        secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        secs(self.read_timeout_secs)
    }

    pub fn pool_timeout(&self) -> Duration {
        secs(self.pool_timeout_secs)
    }

    /// True when `content_type` starts with one of the allowed types.
    pub fn is_allowed(&self, content_type: &str) -> bool {
        let ct = content_type.trim().to_ascii_lowercase();
        self.allowed_content_types
            .iter()
            .any(|allowed| ct.starts_with(allowed.as_str()))
    }
}

fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

fn default_version() -> u32 {
    1
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            data_dir: default_data_dir(),
            server: ServerConfig::default(),
            ingest: IngestConfig::default(),
        }
    }
}

impl Config {
    /// Load `earnings.yaml` under `root` (defaults when absent), then apply
    /// process environment overrides.
    pub fn load(root: &Path) -> Result<Self> {
        Self::load_with_env(root, |name| std::env::var(name).ok())
    }

    pub fn load_with_env(root: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut cfg = Self::load_file(root)?;
        cfg.apply_env(env);
        Ok(cfg)
    }

    /// Load only the YAML file, without environment overrides.
    pub fn load_file(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Absolute data directory for a project rooted at `root`.
    pub fn data_dir(&self, root: &Path) -> PathBuf {
        paths::resolve_data_dir(root, &self.data_dir)
    }

    // -----------------------------------------------------------------------
    // Environment overrides
    // -----------------------------------------------------------------------

    pub fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = env("DATA_DIR").filter(|s| !s.trim().is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(ua) = env("USER_AGENT").filter(|s| !s.trim().is_empty()) {
            self.ingest.user_agent = ua;
        }
        if let Some(types) = env("INGEST_ALLOWED_TYPES") {
            self.ingest.allowed_content_types = types
                .split(',')
                .map(|t| t.trim().to_ascii_lowercase())
                .filter(|t| !t.is_empty())
                .collect();
        }
        if let Some(host) = env("EARNINGS_HOST").filter(|s| !s.trim().is_empty()) {
            self.server.host = host;
        }

        override_parsed(&env, "INGEST_MAX_BYTES", &mut self.ingest.max_bytes);
        override_parsed(
            &env,
            "INGEST_CONNECT_TIMEOUT",
            &mut self.ingest.connect_timeout_secs,
        );
        override_parsed(&env, "INGEST_READ_TIMEOUT", &mut self.ingest.read_timeout_secs);
        override_parsed(&env, "INGEST_POOL_TIMEOUT", &mut self.ingest.pool_timeout_secs);
        override_parsed(
            &env,
            "INGEST_IDEMPOTENCY_TTL_SECONDS",
            &mut self.ingest.idempotency_ttl_secs,
        );
        override_parsed(&env, "INGEST_MAX_RETRIES", &mut self.ingest.max_retries);
        override_parsed(&env, "INGEST_RETRY_BACKOFF_MS", &mut self.ingest.retry_backoff_ms);
        override_parsed(&env, "EARNINGS_PORT", &mut self.server.port);
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.ingest.max_bytes == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "ingest.max_bytes is 0; every download will be rejected".to_string(),
            });
        }

        if self.ingest.allowed_content_types.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "ingest.allowed_content_types is empty; every typed download \
                          will be reported as unsupported"
                    .to_string(),
            });
        }

        if self.ingest.user_agent.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "ingest.user_agent is empty; some origins reject anonymous clients"
                    .to_string(),
            });
        }

        if self.ingest.max_retries > 10 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "ingest.max_retries={} (>10 is unusual)",
                    self.ingest.max_retries
                ),
            });
        }

        for (name, value) in [
            ("connect_timeout_secs", self.ingest.connect_timeout_secs),
            ("read_timeout_secs", self.ingest.read_timeout_secs),
            ("pool_timeout_secs", self.ingest.pool_timeout_secs),
        ] {
            if !(value.is_finite() && value > 0.0) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("ingest.{name} must be a positive number, got {value}"),
                });
            }
        }

        warnings
    }
}

fn override_parsed<T: std::str::FromStr>(
    env: &impl Fn(&str) -> Option<String>,
    name: &str,
    target: &mut T,
) {
    let Some(raw) = env(name) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(v) => *target = v,
        Err(_) => tracing::warn!(var = name, value = %raw, "ignoring unparsable environment value"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.data_dir, PathBuf::from("data"));
        assert_eq!(cfg.ingest.max_bytes, 20 * 1024 * 1024);
        assert_eq!(cfg.ingest.idempotency_ttl_secs, 600);
        assert_eq!(cfg.ingest.connect_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.ingest.read_timeout(), Duration::from_secs(25));
        assert_eq!(
            cfg.ingest.allowed_content_types,
            vec!["text/html", "application/pdf"]
        );
        assert_eq!(cfg.server.port, 8000);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::load_file(dir.path()).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load_file() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::default();
        cfg.ingest.max_retries = 7;
        cfg.data_dir = PathBuf::from("store");
        cfg.save(dir.path()).unwrap();

        let loaded = Config::load_file(dir.path()).unwrap();
        assert_eq!(loaded.ingest.max_retries, 7);
        assert_eq!(loaded.data_dir(dir.path()), dir.path().join("store"));
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("earnings.yaml"),
            "ingest:\n  max_bytes: 1024\n",
        )
        .unwrap();
        let cfg = Config::load_file(dir.path()).unwrap();
        assert_eq!(cfg.ingest.max_bytes, 1024);
        assert_eq!(cfg.ingest.idempotency_ttl_secs, 600);
        assert_eq!(cfg.server, ServerConfig::default());
    }

    #[test]
    fn env_overrides_file_values() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::load_with_env(
            dir.path(),
            env_of(&[
                ("DATA_DIR", "/var/earnings"),
                ("INGEST_MAX_BYTES", "2048"),
                ("INGEST_READ_TIMEOUT", "1.5"),
                ("INGEST_IDEMPOTENCY_TTL_SECONDS", "0"),
                ("INGEST_ALLOWED_TYPES", " Text/HTML , application/json ,"),
                ("USER_AGENT", "tester/1.0"),
            ]),
        )
        .unwrap();

        assert_eq!(cfg.data_dir, PathBuf::from("/var/earnings"));
        assert_eq!(cfg.ingest.max_bytes, 2048);
        assert_eq!(cfg.ingest.read_timeout(), Duration::from_millis(1500));
        assert_eq!(cfg.ingest.idempotency_ttl_secs, 0);
        assert_eq!(
            cfg.ingest.allowed_content_types,
            vec!["text/html", "application/json"]
        );
        assert_eq!(cfg.ingest.user_agent, "tester/1.0");
    }

    #[test]
    fn unparsable_env_value_keeps_previous() {
        let mut cfg = Config::default();
        cfg.apply_env(env_of(&[
            ("INGEST_MAX_BYTES", "lots"),
            ("INGEST_IDEMPOTENCY_TTL_SECONDS", "-5"),
        ]));
        assert_eq!(cfg.ingest.max_bytes, 20 * 1024 * 1024);
        assert_eq!(cfg.ingest.idempotency_ttl_secs, 600);
    }

    #[test]
    fn allow_list_matches_prefix_with_parameters() {
        let ingest = IngestConfig::default();
        assert!(ingest.is_allowed("text/html; charset=utf-8"));
        assert!(ingest.is_allowed("Application/PDF"));
        assert!(!ingest.is_allowed("image/png"));
    }

    #[test]
    fn validate_default_config_no_warnings() {
        assert!(Config::default().validate().is_empty());
    }

    #[test]
    fn validate_flags_bad_values() {
        let mut cfg = Config::default();
        cfg.ingest.max_bytes = 0;
        cfg.ingest.max_retries = 15;
        cfg.ingest.allowed_content_types.clear();
        cfg.ingest.read_timeout_secs = -1.0;
        let warnings = cfg.validate();

        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("max_bytes")));
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("max_retries=15") && w.message.contains(">10 is unusual")));
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("allowed_content_types")));
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("read_timeout_secs")));
    }
}
