use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one conversation. Supplied by the transport (a chat id for Telegram).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for SessionId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A document attached to an inbound message.
///
/// Only the transport knows how to fetch the bytes behind `file_id`; the core
/// inspects the declared type and hands the reference to a `DocumentSource`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub file_id: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

impl DocumentRef {
    pub fn new(file_id: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            file_name: None,
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Whether the document declares itself as a PDF.
    ///
    /// The declared MIME type wins; the file extension is only consulted when
    /// the transport did not report a type at all.
    pub fn is_pdf(&self) -> bool {
        match self.mime_type.as_deref() {
            Some(mime) => mime.trim().eq_ignore_ascii_case("application/pdf"),
            None => self
                .file_name
                .as_deref()
                .map(|name| name.to_ascii_lowercase().ends_with(".pdf"))
                .unwrap_or(false),
        }
    }
}
