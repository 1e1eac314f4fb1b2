//! Configuration loading and validation.
//!
//! Outreach reads a single human-owned `config.toml` from `~/.outreach/`
//! (or an explicit path). Every section is optional and falls back to
//! defaults, so an absent file yields a working configuration that drafts
//! with the Gemini provider when `GOOGLE_API_KEY` is available.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Record store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Generative refinement settings.
    #[serde(default)]
    pub refinement: RefinementConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Record store settings.
#[derive(Debug, Default, Deserialize)]
pub struct StoreConfig {
    /// SQLite database path. Defaults to `~/.outreach/records.db`.
    pub database: Option<PathBuf>,
}

/// Generative refinement settings.
#[derive(Debug, Deserialize)]
pub struct RefinementConfig {
    /// Whether rendered drafts are sent to providers for polishing at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Ordered `<provider>/<model>` specs; the first entry is the primary,
    /// later entries are tried only when earlier ones fail.
    #[serde(default = "default_providers")]
    pub providers: Vec<String>,

    /// Maximum tokens requested from a provider.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature passed to providers that accept one.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Per-call HTTP timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Reject refined text that no longer carries the embedded facts verbatim.
    #[serde(default = "default_verify_facts")]
    pub verify_facts: bool,
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            providers: default_providers(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            request_timeout_secs: default_request_timeout_secs(),
            verify_facts: default_verify_facts(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Default, Deserialize)]
pub struct LoggingConfig {
    /// Directory for rotated JSON logs. Console-only logging when unset.
    pub dir: Option<PathBuf>,
}

// Default value functions for serde

fn default_enabled() -> bool {
    true
}
fn default_providers() -> Vec<String> {
    vec![
        "gemini/gemini-2.5-pro".to_owned(),
        "gemini/gemini-2.5-flash".to_owned(),
    ]
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_temperature() -> f32 {
    0.7
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_verify_facts() -> bool {
    true
}

/// Resolved filesystem layout under the config directory.
#[derive(Debug, Clone)]
pub struct RuntimePaths {
    /// Root directory (`~/.outreach/`).
    pub root: PathBuf,
    /// Human-owned configuration file.
    pub config_toml: PathBuf,
    /// Credentials file.
    pub env_file: PathBuf,
    /// Default record store location.
    pub database: PathBuf,
}

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read config at {}: {e}", path.display()))?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("failed to parse config at {}: {e}", path.display()))?;
    Ok(config)
}

/// Load `~/.outreach/config.toml`, or defaults when the file does not exist.
///
/// # Errors
///
/// Returns an error if the home directory cannot be resolved or an existing
/// file is invalid.
pub fn load_default_config() -> anyhow::Result<Config> {
    let paths = runtime_paths()?;
    if !paths.config_toml.exists() {
        tracing::info!(path = %paths.config_toml.display(), "no config file found, using defaults");
        return Ok(Config::default());
    }
    load_config(&paths.config_toml)
}

/// Resolve the default config directory (`~/.outreach/`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> anyhow::Result<PathBuf> {
    let home = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.home_dir().join(".outreach"))
}

/// Resolve every runtime path under [`config_dir`].
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn runtime_paths() -> anyhow::Result<RuntimePaths> {
    let root = config_dir()?;
    Ok(RuntimePaths {
        config_toml: root.join("config.toml"),
        env_file: root.join(".env"),
        database: root.join("records.db"),
        root,
    })
}

impl Config {
    /// Database path from config, or the runtime default.
    pub fn database_path(&self, paths: &RuntimePaths) -> PathBuf {
        self.store
            .database
            .clone()
            .unwrap_or_else(|| paths.database.clone())
    }
}
