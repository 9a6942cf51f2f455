//! # adwise
//!
//! The core of a chat assistant that collects a short business profile through a
//! fixed questionnaire and asks an AI provider for marketing keyword suggestions.
//!
//! The crate is transport-agnostic. Chat delivery, document download, PDF parsing
//! and benchmark scraping are consumed through the traits in [`providers`], which
//! the `adwise-bot`, `adwise-pdf` and `adwise-html` crates implement.

pub mod chunk;
pub mod commands;
pub mod constants;
pub mod conversation;
pub mod errors;
pub mod prompts;
pub mod providers;
pub mod session;
pub mod types;

pub use conversation::{Conversation, ConversationBuilder, Event, Reply, State};
pub use errors::{
    BuildError, DocumentError, ExtractionError, FetchError, GenerationError, TransportError,
};
pub use types::{DocumentRef, SessionId};
