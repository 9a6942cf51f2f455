//! # Application Configuration
//!
//! Loads the bot's configuration from programmatic defaults, an optional
//! `config.yml` and environment variables, in that order of precedence.

use adwise::{
    constants::{DEFAULT_BENCHMARK_SELECTOR, DEFAULT_BENCHMARK_URL},
    providers::factory::{ProviderKind, ProviderSettings},
};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use regex::Regex;
use serde::Deserialize;
use std::{env, fs, path::Path, sync::LazyLock, time::Duration};
use thiserror::Error;
use tracing::info;

/// The config file read when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "config.yml";

static ENV_PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}").expect("static regex is valid"));

/// A custom error type for configuration issues.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    #[error("Configuration error: {0}")]
    General(String),
    /// A required secret is absent or empty.
    #[error("Missing required secret: {0}")]
    MissingSecret(&'static str),
    #[error("Invalid value for '{key}': {message}")]
    Invalid { key: &'static str, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// How updates reach the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Polling,
    Webhook,
}

/// The resolved configuration.
#[derive(Deserialize, Clone)]
pub struct AppConfig {
    /// Filled in from `TELEGRAM_BOT_API_KEY` after the other layers resolve.
    #[serde(skip)]
    pub telegram_bot_api_key: String,
    /// Filled in from `OPENAI_API_KEY`, or `AI_API_KEY` when that is unset.
    #[serde(skip)]
    pub ai_api_key: String,

    pub ai_provider: String,
    #[serde(default)]
    pub ai_api_url: Option<String>,
    #[serde(default)]
    pub ai_model: Option<String>,

    pub mode: RunMode,
    pub port: u16,
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub webhook_secret: Option<String>,

    /// Offers the document-refinement branch after keyword generation.
    pub upload_branch: bool,
    pub announce_on_startup: bool,

    pub benchmark_url: String,
    pub benchmark_selector: String,

    pub telegram_api_url: String,
    pub http_timeout_secs: u64,
    /// Long-polling wait passed to `getUpdates`.
    pub poll_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("ai_provider", &self.ai_provider)
            .field("ai_api_url", &self.ai_api_url)
            .field("ai_model", &self.ai_model)
            .field("mode", &self.mode)
            .field("port", &self.port)
            .field("webhook_url", &self.webhook_url)
            .field("upload_branch", &self.upload_branch)
            .field("announce_on_startup", &self.announce_on_startup)
            .field("benchmark_url", &self.benchmark_url)
            .field("telegram_api_url", &self.telegram_api_url)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// The settings for the configured AI provider.
    pub fn provider_settings(&self) -> Result<ProviderSettings, ConfigError> {
        let kind: ProviderKind =
            self.ai_provider
                .parse()
                .map_err(|message| ConfigError::Invalid {
                    key: "ai_provider",
                    message,
                })?;
        Ok(ProviderSettings {
            kind,
            api_url: self.ai_api_url.clone(),
            api_key: self.ai_api_key.clone(),
            model: self.ai_model.clone(),
            timeout: Some(self.http_timeout()),
        })
    }
}

#[derive(Deserialize, Default)]
struct Secrets {
    #[serde(default)]
    telegram_bot_api_key: Option<String>,
    #[serde(default)]
    openai_api_key: Option<String>,
    #[serde(default)]
    ai_api_key: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// Reads a file and substitutes `${VAR}` placeholders from the environment.
// Returns Ok(None) if the file does not exist.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let expanded = ENV_PLACEHOLDER_RE.replace_all(&content, |caps: &regex::Captures| {
        env::var(&caps["var"]).unwrap_or_default()
    });

    Ok(Some(expanded.into_owned()))
}

/// Loads the application configuration.
///
/// - Top-level keys such as `port` are overridden by plain variables (`PORT`).
/// - Any key can be overridden by an `ADWISE_` variable (`ADWISE_UPLOAD_BRANCH`).
/// - `TELEGRAM_BOT_API_KEY` and `OPENAI_API_KEY` (or `AI_API_KEY`) are required.
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder()
        // Layer 1: Programmatic defaults.
        .set_default("ai_provider", ProviderKind::default().to_string())?
        .set_default("mode", "polling")?
        .set_default("port", 8080)?
        .set_default("upload_branch", true)?
        .set_default("announce_on_startup", false)?
        .set_default("benchmark_url", DEFAULT_BENCHMARK_URL)?
        .set_default("benchmark_selector", DEFAULT_BENCHMARK_SELECTOR)?
        .set_default("telegram_api_url", "https://api.telegram.org")?
        .set_default("http_timeout_secs", 30)?
        .set_default("poll_timeout_secs", 30)?;

    // Layer 2: Optional config file.
    let config_path = config_path_override.unwrap_or(DEFAULT_CONFIG_PATH);
    if let Some(content) = read_and_substitute(config_path)? {
        info!("Loading configuration from '{config_path}'.");
        builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
    } else if config_path_override.is_some() {
        return Err(ConfigError::General(format!(
            "Config file not found at '{config_path}'"
        )));
    }

    let settings = builder
        // Layer 3: Plain environment variables for top-level keys.
        .add_source(Environment::default())
        // Layer 4: Prefixed environment variables.
        .add_source(
            Environment::with_prefix("ADWISE")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let secrets: Secrets = settings.clone().try_deserialize()?;
    let mut config: AppConfig = settings.try_deserialize()?;

    config.telegram_bot_api_key = non_empty(secrets.telegram_bot_api_key)
        .ok_or(ConfigError::MissingSecret("TELEGRAM_BOT_API_KEY"))?;
    config.ai_api_key = non_empty(secrets.openai_api_key)
        .or_else(|| non_empty(secrets.ai_api_key))
        .ok_or(ConfigError::MissingSecret("OPENAI_API_KEY"))?;

    // Fail on an unknown provider now rather than at first use.
    config.provider_settings()?;

    if config.mode == RunMode::Webhook && non_empty(config.webhook_url.clone()).is_none() {
        return Err(ConfigError::Invalid {
            key: "webhook_url",
            message: "required when mode is 'webhook'".to_string(),
        });
    }

    Ok(config)
}
