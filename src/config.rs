use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Env var naming an alternative config file (without the `.toml` suffix is
/// fine too).
pub const CONFIG_PATH_ENV: &str = "CLASSTRACK_CONFIG";

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Memory,
    Hosted,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Memory => "memory",
            BackendKind::Hosted => "hosted",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub kind: BackendKind,
    /// Workspace directory for the hosted backend.
    pub path: Option<PathBuf>,
    /// Load the bundled demo roster into the memory backend.
    pub seed: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GradingConfig {
    pub allow_from_pending: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ViewsConfig {
    pub top_performers: usize,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub grading: GradingConfig,
    pub views: ViewsConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let file = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "classtrack".to_string());
        Self::builder(&file)?
            // Override from environment (e.g., CLASSTRACK__BACKEND__KIND=hosted)
            .add_source(Environment::with_prefix("CLASSTRACK").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Defaults plus an optional file, without the environment layer.
    #[cfg(test)]
    pub fn from_file(file: &str) -> Result<Self, ConfigError> {
        Self::builder(file)?.build()?.try_deserialize()
    }

    fn builder(
        file: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("backend.kind", "memory")?
            .set_default("backend.seed", true)?
            .set_default("grading.allow_from_pending", false)?
            .set_default("views.top_performers", crate::views::DEFAULT_TOP_PERFORMERS as u64)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "text")?
            .add_source(File::with_name(file).required(false)))
    }
}
