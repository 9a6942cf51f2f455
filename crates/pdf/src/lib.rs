//! # adwise-pdf: PDF Text Extraction
//!
//! Implements the `TextExtractor` collaborator for uploaded PDF documents.
//! Parsing is CPU-bound, so it runs on Tokio's blocking pool.

use adwise::{errors::ExtractionError, providers::document::TextExtractor};
use async_trait::async_trait;
use pdf::file::FileOptions;
use tracing::{debug, instrument};

/// Extracts the text drawn on every page of a PDF.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    #[instrument(skip_all, fields(bytes = document.len()))]
    async fn extract_text(&self, document: &[u8]) -> Result<String, ExtractionError> {
        let data = document.to_vec();
        let pages = tokio::task::spawn_blocking(move || extract_pages(&data))
            .await
            .map_err(|e| ExtractionError::Task(e.to_string()))??;
        debug!(pages = pages.len(), "PDF parsed");
        Ok(join_pages(&pages))
    }
}

/// Extracts the text of each page, in page order.
pub fn extract_pages(pdf_data: &[u8]) -> Result<Vec<String>, ExtractionError> {
    let file = FileOptions::cached()
        .load(pdf_data)
        .map_err(|e| ExtractionError::Parse(e.to_string()))?;
    let resolver = file.resolver();
    let mut pages = Vec::with_capacity(file.num_pages() as usize);

    for page_num in 0..file.num_pages() {
        let page = file
            .get_page(page_num)
            .map_err(|e| ExtractionError::Parse(e.to_string()))?;
        let mut page_text = String::new();
        if let Some(content) = &page.contents {
            let operations = content
                .operations(&resolver)
                .map_err(|e| ExtractionError::Parse(e.to_string()))?;
            for op in operations.iter() {
                if let pdf::content::Op::TextDraw { text } = op {
                    page_text.push_str(&text.to_string_lossy());
                }
            }
        }
        pages.push(page_text);
    }
    Ok(pages)
}

/// Joins page texts with newlines; a document without any text yields `""`.
pub fn join_pages(pages: &[String]) -> String {
    if pages.iter().all(|p| p.trim().is_empty()) {
        return String::new();
    }
    pages.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_pages() {
        let pages = vec!["first".to_string(), "second".to_string()];
        assert_eq!(join_pages(&pages), "first\nsecond");
    }

    #[test]
    fn test_join_pages_without_text() {
        assert_eq!(join_pages(&[]), "");
        assert_eq!(join_pages(&["".to_string(), "  ".to_string()]), "");
    }
}
