//! # Commands
//!
//! Slash-command parsing and the stateless commands (`/trends`, `/faq`, `/help`).
//! Stateless commands never look at or change a conversation; they can run at any
//! time, inside or outside the questionnaire.

use crate::{
    chunk::split_message,
    constants::{
        FAQ_APOLOGY, FAQ_USAGE, MESSAGE_CHUNK_LIMIT, TRENDS_APOLOGY, TRENDS_HEADER,
        WELCOME_MESSAGE,
    },
    prompts::{build_faq_prompt, faq_options, FAQ_SYSTEM_PROMPT},
    providers::{ai::AiProvider, benchmark::BenchmarkSource},
};
use tracing::{error, info};

/// A recognised slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Cancel,
    Trends,
    Faq,
    Help,
    Unknown(String),
}

/// Splits `/name@bot rest of message` into the command and its argument text.
///
/// Returns `None` for anything that is not a command, so plain answers such as
/// "no" or a URL are never mistaken for one.
pub fn parse_command(text: &str) -> Option<(Command, &str)> {
    let text = text.trim_start();
    let body = text.strip_prefix('/')?;
    let (token, args) = match body.find(char::is_whitespace) {
        Some(idx) => (&body[..idx], body[idx..].trim()),
        None => (body, ""),
    };
    let name = token.split('@').next().unwrap_or_default();
    if name.is_empty() {
        return None;
    }

    let command = match name.to_ascii_lowercase().as_str() {
        "start" => Command::Start,
        "cancel" => Command::Cancel,
        "trends" => Command::Trends,
        "faq" => Command::Faq,
        "help" => Command::Help,
        _ => Command::Unknown(name.to_string()),
    };
    Some((command, args))
}

/// The welcome text listing every command.
pub fn help() -> String {
    WELCOME_MESSAGE.to_string()
}

/// Fetches the benchmark text and splits it into sendable messages.
pub async fn trends(source: &dyn BenchmarkSource) -> Vec<String> {
    match source.fetch_benchmarks().await {
        Ok(data) => {
            info!("Fetched {} characters of benchmark data", data.len());
            split_message(&format!("{TRENDS_HEADER}\n{data}"), MESSAGE_CHUNK_LIMIT)
        }
        Err(e) => {
            error!("Failed to fetch trends: {e}");
            vec![TRENDS_APOLOGY.to_string()]
        }
    }
}

/// Answers a free-form marketing question.
///
/// `question` is the text after `/faq`. An empty question returns usage help
/// without calling the provider.
pub async fn faq(ai_provider: &dyn AiProvider, question: &str) -> Vec<String> {
    let prompt = build_faq_prompt(question);
    if prompt.is_empty() {
        return vec![FAQ_USAGE.to_string()];
    }

    match ai_provider
        .generate(FAQ_SYSTEM_PROMPT, &prompt, faq_options())
        .await
    {
        Ok(answer) => split_message(&answer, MESSAGE_CHUNK_LIMIT),
        Err(e) => {
            error!("FAQ generation failed: {e}");
            vec![FAQ_APOLOGY.to_string()]
        }
    }
}
