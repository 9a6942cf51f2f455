//! # Application State
//!
//! Wires the configured collaborators into a `Conversation`, an update handler
//! and the per-chat dispatcher.

use crate::{
    config::AppConfig,
    dispatcher::{Dispatcher, UpdateHandler, DEFAULT_IDLE_TIMEOUT},
    telegram::TelegramClient,
};
use adwise::{
    providers::{ai::AiProvider, factory::create_provider},
    Conversation,
};
use adwise_html::HtmlBenchmarkSource;
use adwise_pdf::PdfTextExtractor;
use std::sync::Arc;
use tracing::info;

/// The shared application state, accessible from the runners and handlers.
#[derive(Clone)]
pub struct AppState {
    pub telegram: Arc<TelegramClient>,
    pub dispatcher: Dispatcher,
    /// Expected value of the webhook secret-token header, if any.
    pub webhook_secret: Option<String>,
}

/// Builds the shared application state from the configuration.
pub fn build_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let timeout = Some(config.http_timeout());

    let ai_provider: Arc<dyn AiProvider> =
        Arc::from(create_provider(&config.provider_settings()?)?);
    let telegram = Arc::new(TelegramClient::new(
        &config.telegram_api_url,
        &config.telegram_bot_api_key,
        timeout,
    )?);
    let benchmarks = Arc::new(HtmlBenchmarkSource::new(
        &config.benchmark_url,
        &config.benchmark_selector,
        timeout,
    )?);

    let conversation = Conversation::builder()
        .ai_provider(Arc::clone(&ai_provider))
        .document_source(telegram.clone())
        .text_extractor(Arc::new(PdfTextExtractor::new()))
        .upload_branch(config.upload_branch)
        .build()?;
    info!(
        provider = %config.ai_provider,
        upload_branch = config.upload_branch,
        "Conversation configured"
    );

    let handler = UpdateHandler::new(Arc::new(conversation), ai_provider, benchmarks);
    let dispatcher = Dispatcher::new(handler, telegram.clone(), DEFAULT_IDLE_TIMEOUT);

    Ok(AppState {
        telegram,
        dispatcher,
        webhook_secret: config.webhook_secret.clone().filter(|s| !s.is_empty()),
    })
}
