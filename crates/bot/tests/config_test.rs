//! # Configuration Tests
//!
//! Environment variables are process-global, so every test here runs serially
//! and starts from a clean slate.

use adwise_bot::config::{get_config, ConfigError, RunMode};
use serial_test::serial;
use std::{env, io::Write};
use tempfile::NamedTempFile;

/// Clears all environment variables read by `get_config`.
fn clear_env_vars() {
    for var in [
        "TELEGRAM_BOT_API_KEY",
        "OPENAI_API_KEY",
        "AI_API_KEY",
        "AI_PROVIDER",
        "AI_API_URL",
        "AI_MODEL",
        "MODE",
        "PORT",
        "WEBHOOK_URL",
        "WEBHOOK_SECRET",
        "UPLOAD_BRANCH",
        "ANNOUNCE_ON_STARTUP",
        "BENCHMARK_URL",
        "BENCHMARK_SELECTOR",
        "TELEGRAM_API_URL",
        "HTTP_TIMEOUT_SECS",
        "POLL_TIMEOUT_SECS",
        "ADWISE_AI_PROVIDER",
        "ADWISE_UPLOAD_BRANCH",
        "ADWISE_POLL_TIMEOUT_SECS",
        "TEST_BOT_TOKEN",
    ] {
        env::remove_var(var);
    }
}

fn set_required_secrets() {
    env::set_var("TELEGRAM_BOT_API_KEY", "123:telegram");
    env::set_var("OPENAI_API_KEY", "sk-openai");
}

#[test]
#[serial]
fn test_defaults() {
    clear_env_vars();
    set_required_secrets();

    let config = get_config(None).expect("Configuration should load successfully");

    assert_eq!(config.telegram_bot_api_key, "123:telegram");
    assert_eq!(config.ai_api_key, "sk-openai");
    assert_eq!(config.ai_provider, "openai");
    assert!(config.ai_api_url.is_none());
    assert!(config.ai_model.is_none());
    assert_eq!(config.mode, RunMode::Polling);
    assert_eq!(config.port, 8080);
    assert!(config.upload_branch);
    assert!(!config.announce_on_startup);
    assert_eq!(
        config.benchmark_url,
        "https://databox.com/ppc-industry-benchmarks"
    );
    assert_eq!(config.benchmark_selector, ".benchmarks-content");
    assert_eq!(config.telegram_api_url, "https://api.telegram.org");
    assert_eq!(config.http_timeout_secs, 30);
    assert_eq!(config.poll_timeout_secs, 30);

    clear_env_vars();
}

#[test]
#[serial]
fn test_missing_telegram_key() {
    clear_env_vars();
    env::set_var("OPENAI_API_KEY", "sk-openai");

    let result = get_config(None);

    assert!(matches!(
        result,
        Err(ConfigError::MissingSecret("TELEGRAM_BOT_API_KEY"))
    ));
    clear_env_vars();
}

#[test]
#[serial]
fn test_missing_ai_key() {
    clear_env_vars();
    env::set_var("TELEGRAM_BOT_API_KEY", "123:telegram");

    let result = get_config(None);

    assert!(matches!(
        result,
        Err(ConfigError::MissingSecret("OPENAI_API_KEY"))
    ));
    clear_env_vars();
}

#[test]
#[serial]
fn test_empty_secret_counts_as_missing() {
    clear_env_vars();
    set_required_secrets();
    env::set_var("TELEGRAM_BOT_API_KEY", "  ");

    let result = get_config(None);

    assert!(matches!(
        result,
        Err(ConfigError::MissingSecret("TELEGRAM_BOT_API_KEY"))
    ));
    clear_env_vars();
}

#[test]
#[serial]
fn test_ai_api_key_alias() {
    clear_env_vars();
    env::set_var("TELEGRAM_BOT_API_KEY", "123:telegram");
    env::set_var("AI_API_KEY", "alias-key");

    let config = get_config(None).expect("alias should satisfy the AI secret");
    assert_eq!(config.ai_api_key, "alias-key");

    // The primary name wins when both are present.
    env::set_var("OPENAI_API_KEY", "primary-key");
    let config = get_config(None).unwrap();
    assert_eq!(config.ai_api_key, "primary-key");

    clear_env_vars();
}

#[test]
#[serial]
fn test_environment_overrides() {
    clear_env_vars();
    set_required_secrets();
    env::set_var("PORT", "9999");
    env::set_var("MODE", "webhook");
    env::set_var("WEBHOOK_URL", "https://bot.example/telegram/webhook");
    env::set_var("ADWISE_AI_PROVIDER", "gemini");
    env::set_var("ADWISE_UPLOAD_BRANCH", "false");
    env::set_var("ADWISE_POLL_TIMEOUT_SECS", "5");

    let config = get_config(None).expect("Configuration should load successfully");

    assert_eq!(config.port, 9999);
    assert_eq!(config.mode, RunMode::Webhook);
    assert_eq!(
        config.webhook_url.as_deref(),
        Some("https://bot.example/telegram/webhook")
    );
    assert_eq!(config.ai_provider, "gemini");
    assert!(!config.upload_branch);
    assert_eq!(config.poll_timeout_secs, 5);
    assert_eq!(
        config.provider_settings().unwrap().kind.to_string(),
        "gemini"
    );

    clear_env_vars();
}

#[test]
#[serial]
fn test_config_file_with_substitution() {
    clear_env_vars();
    env::set_var("OPENAI_API_KEY", "sk-openai");
    env::set_var("TEST_BOT_TOKEN", "456:from-file");

    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "telegram_bot_api_key: \"${{TEST_BOT_TOKEN}}\"\n\
         ai_model: gpt-4o-mini\n\
         benchmark_selector: \".stats\"\n\
         announce_on_startup: true"
    )
    .unwrap();

    let config = get_config(file.path().to_str()).expect("file config should load");

    assert_eq!(config.telegram_bot_api_key, "456:from-file");
    assert_eq!(config.ai_model.as_deref(), Some("gpt-4o-mini"));
    assert_eq!(config.benchmark_selector, ".stats");
    assert!(config.announce_on_startup);

    // Plain environment variables take precedence over the file.
    env::set_var("BENCHMARK_SELECTOR", ".override");
    let config = get_config(file.path().to_str()).unwrap();
    assert_eq!(config.benchmark_selector, ".override");

    clear_env_vars();
}

#[test]
#[serial]
fn test_missing_explicit_config_file() {
    clear_env_vars();
    set_required_secrets();

    let result = get_config(Some("/definitely/not/here/config.yml"));

    assert!(matches!(result, Err(ConfigError::General(_))));
    clear_env_vars();
}

#[test]
#[serial]
fn test_unknown_provider() {
    clear_env_vars();
    set_required_secrets();
    env::set_var("AI_PROVIDER", "mystery");

    let result = get_config(None);

    assert!(matches!(
        result,
        Err(ConfigError::Invalid {
            key: "ai_provider",
            ..
        })
    ));
    clear_env_vars();
}

#[test]
#[serial]
fn test_webhook_mode_requires_url() {
    clear_env_vars();
    set_required_secrets();
    env::set_var("MODE", "webhook");

    let result = get_config(None);

    assert!(matches!(
        result,
        Err(ConfigError::Invalid {
            key: "webhook_url",
            ..
        })
    ));
    clear_env_vars();
}

#[test]
#[serial]
fn test_invalid_port() {
    clear_env_vars();
    set_required_secrets();
    env::set_var("PORT", "not-a-port");

    let result = get_config(None);

    assert!(matches!(result, Err(ConfigError::General(_))));
    clear_env_vars();
}
