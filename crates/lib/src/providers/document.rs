//! Collaborators used by the document-refinement branch.

use crate::{
    errors::{ExtractionError, TransportError},
    types::DocumentRef,
};
use async_trait::async_trait;

/// Fetches the raw bytes behind a transport document reference.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn download(&self, document: &DocumentRef) -> Result<Vec<u8>, TransportError>;
}

/// Turns document bytes into plain text.
///
/// Implementations concatenate pages with `\n` and return an empty string when
/// the document carries no extractable text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, document: &[u8]) -> Result<String, ExtractionError>;
}
