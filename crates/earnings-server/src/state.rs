use earnings_core::config::Config;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(root: PathBuf, config: Config) -> Self {
        Self {
            root,
            config: Arc::new(config),
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.config.data_dir(&self.root)
    }
}
