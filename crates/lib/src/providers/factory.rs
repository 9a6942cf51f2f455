//! # AI Provider Factory
//!
//! Centralizes the creation of AI provider instances from configuration values so
//! the bot and the tests build providers the same way.

use crate::{
    errors::GenerationError,
    providers::ai::{
        gemini::{gemini_api_url, GeminiProvider, DEFAULT_GEMINI_MODEL},
        openai::{OpenAiProvider, OPENAI_CHAT_COMPLETIONS_URL},
        AiProvider,
    },
};
use serde::Deserialize;
use std::{fmt, str::FromStr, time::Duration};
use tracing::info;

/// The supported provider families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Openai,
    Gemini,
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" | "local" => Ok(ProviderKind::Openai),
            "gemini" => Ok(ProviderKind::Gemini),
            other => Err(format!("Unsupported AI provider: {other}")),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Openai => f.write_str("openai"),
            ProviderKind::Gemini => f.write_str("gemini"),
        }
    }
}

/// Everything needed to build one provider.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    /// Overrides the provider's public endpoint (OpenAI-compatible servers, tests).
    pub api_url: Option<String>,
    pub api_key: String,
    pub model: Option<String>,
    pub timeout: Option<Duration>,
}

/// Creates an AI provider instance from resolved settings.
pub fn create_provider(settings: &ProviderSettings) -> Result<Box<dyn AiProvider>, GenerationError> {
    let provider: Box<dyn AiProvider> = match settings.kind {
        ProviderKind::Openai => {
            let api_url = settings
                .api_url
                .clone()
                .unwrap_or_else(|| OPENAI_CHAT_COMPLETIONS_URL.to_string());
            info!("Configuring OpenAI-compatible provider with URL: {}", api_url);
            Box::new(OpenAiProvider::new(
                api_url,
                Some(settings.api_key.clone()),
                settings.model.clone(),
                settings.timeout,
            )?)
        }
        ProviderKind::Gemini => {
            let model = settings.model.as_deref().unwrap_or(DEFAULT_GEMINI_MODEL);
            let api_url = settings
                .api_url
                .clone()
                .unwrap_or_else(|| gemini_api_url(model));
            info!("Configuring Gemini provider with URL: {}", api_url);
            Box::new(GeminiProvider::new(
                api_url,
                settings.api_key.clone(),
                settings.timeout,
            )?)
        }
    };

    Ok(provider)
}
