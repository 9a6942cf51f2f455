pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod handlers;
pub mod router;
pub mod state;
pub mod telegram;

use crate::{
    config::{get_config, RunMode},
    dispatcher::ChatUpdate,
    router::create_router,
    state::{build_app_state, AppState},
    telegram::TelegramClient,
};
use adwise::commands;
use std::{future::Future, net::SocketAddr, time::Duration};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::FmtSubscriber;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Sends the welcome text to every chat that has a pending update.
///
/// Pending updates are left unacknowledged, so the runner still handles them.
pub async fn announce(telegram: &TelegramClient) -> anyhow::Result<usize> {
    let updates = telegram.get_updates(None, 0).await?;
    let mut chats: Vec<i64> = updates
        .into_iter()
        .filter_map(|update| update.message.map(|m| m.chat.id))
        .collect();
    chats.sort_unstable();
    chats.dedup();

    let welcome = commands::help();
    for chat_id in &chats {
        if let Err(e) = telegram.send_message(*chat_id, &welcome).await {
            error!(chat_id, "Failed to send welcome message: {e}");
        }
    }
    info!(chats = chats.len(), "Startup announcement sent");
    Ok(chats.len())
}

/// Long-polls `getUpdates` until `shutdown` resolves.
///
/// Each update is acknowledged by advancing the offset once it is queued.
/// Polling errors are retried with exponential backoff.
pub async fn run_polling(
    app_state: AppState,
    poll_timeout_secs: u64,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<()> {
    tokio::pin!(shutdown);
    let mut offset: Option<i64> = None;
    let mut backoff = INITIAL_BACKOFF;
    info!("Polling for updates");

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            result = app_state.telegram.get_updates(offset, poll_timeout_secs) => match result {
                Ok(updates) => {
                    backoff = INITIAL_BACKOFF;
                    for update in updates {
                        offset = Some(update.update_id + 1);
                        if let Some(chat_update) = ChatUpdate::from_update(update) {
                            app_state.dispatcher.dispatch(chat_update);
                        }
                    }
                }
                Err(e) => {
                    warn!("Polling failed, retrying in {backoff:?}: {e}");
                    tokio::select! {
                        _ = &mut shutdown => break,
                        _ = tokio::time::sleep(backoff) => {}
                    }
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                }
            }
        }
    }

    info!("Polling stopped");
    Ok(())
}

/// Registers the webhook and serves it until `shutdown` resolves.
pub async fn run_webhook(
    listener: TcpListener,
    app_state: AppState,
    webhook_url: &str,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    app_state
        .telegram
        .set_webhook(webhook_url, app_state.webhook_secret.as_deref())
        .await?;
    info!(%webhook_url, "Webhook registered");

    let app = create_router(app_state);
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// The binary's entry point.
///
/// Sets up logging and configuration, then runs in the configured mode.
pub async fn start() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = std::env::var("CONFIG_PATH").ok();
    let config = get_config(config_path.as_deref())?;
    info!(?config, "Configuration loaded");

    let app_state = build_app_state(&config)?;

    // getUpdates is refused while a webhook is registered; webhook mode
    // registers it again afterwards.
    if config.mode == RunMode::Polling || config.announce_on_startup {
        if let Err(e) = app_state.telegram.delete_webhook().await {
            warn!("Could not remove webhook: {e}");
        }
    }
    if config.announce_on_startup {
        if let Err(e) = announce(&app_state.telegram).await {
            warn!("Startup announcement failed: {e}");
        }
    }

    match config.mode {
        RunMode::Polling => {
            run_polling(app_state, config.poll_timeout_secs, shutdown_signal()).await
        }
        RunMode::Webhook => {
            let webhook_url = config.webhook_url.clone().unwrap_or_default();
            let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
            let listener = TcpListener::bind(addr).await?;
            run_webhook(listener, app_state, &webhook_url, shutdown_signal()).await
        }
    }
}
