//! # Session State
//!
//! A session is one user's in-flight questionnaire: the current `State` plus the
//! answers collected so far. Sessions live in a `SessionStore` only between the
//! `/start` entry transition and the end of the conversation; absence of a session
//! means the user is not in a conversation.

mod locks;
mod memory;

pub use locks::{SessionGuard, SessionLocks};
pub use memory::InMemorySessionStore;

use crate::{conversation::State, types::SessionId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};

/// The business-profile fields collected by the questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Industry,
    Objective,
    Website,
    SocialMedia,
    Ppc,
    Audience,
    Location,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Industry,
        Field::Objective,
        Field::Website,
        Field::SocialMedia,
        Field::Ppc,
        Field::Audience,
        Field::Location,
    ];

    /// The key under which the answer is stored.
    pub fn key(self) -> &'static str {
        match self {
            Field::Industry => "industry",
            Field::Objective => "objective",
            Field::Website => "website",
            Field::SocialMedia => "social_media",
            Field::Ppc => "ppc",
            Field::Audience => "audience",
            Field::Location => "location",
        }
    }

    /// The string read in place of an answer that was never given.
    pub fn default_value(self) -> &'static str {
        match self {
            Field::Website => "No website provided",
            Field::SocialMedia => "No social media provided",
            Field::Ppc => "No PPC campaigns",
            Field::Industry | Field::Objective | Field::Audience | Field::Location => {
                "Not specified"
            }
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Answers collected so far, keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedFields(HashMap<Field, String>);

impl CollectedFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an answer verbatim, replacing any earlier one.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.0.insert(field, value.into());
    }

    /// The stored answer, if any.
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// The stored answer or the field's default sentinel.
    pub fn value_or_default(&self, field: Field) -> &str {
        self.get(field).unwrap_or_else(|| field.default_value())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(Field, S)> for CollectedFields {
    fn from_iter<I: IntoIterator<Item = (Field, S)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(f, v)| (f, v.into())).collect())
    }
}

/// One active conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub state: State,
    pub fields: CollectedFields,
}

impl Session {
    /// A fresh session positioned on the first question.
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            state: State::FIRST,
            fields: CollectedFields::new(),
        }
    }
}

/// Storage for active sessions, keyed by session id.
///
/// Callers serialize access per id through `SessionLocks`; implementations only
/// need to isolate distinct keys from each other.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, id: &SessionId) -> Option<Session>;
    async fn put(&self, session: Session);
    async fn delete(&self, id: &SessionId) -> Option<Session>;
}
