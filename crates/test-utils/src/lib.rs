//! # Test Utilities
//!
//! Mock collaborators shared by the integration tests of every `adwise` crate.

use adwise::{
    errors::{ExtractionError, FetchError, GenerationError, TransportError},
    providers::{
        ai::{AiProvider, GenerationOptions},
        benchmark::BenchmarkSource,
        document::{DocumentSource, TextExtractor},
    },
    DocumentRef,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One recorded call to `MockAiProvider::generate`.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedCall {
    pub system_prompt: String,
    pub user_prompt: String,
    pub options: GenerationOptions,
}

// --- Mock AI Provider ---

#[derive(Clone, Debug, Default)]
pub struct MockAiProvider {
    responses: Arc<Mutex<HashMap<String, String>>>,
    default_response: Arc<Mutex<Option<String>>>,
    failing: Arc<Mutex<bool>>,
    delay: Arc<Mutex<Option<Duration>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockAiProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-programs a response for a specific prompt.
    /// The key should be a unique substring of the user prompt.
    pub fn add_response(&self, key: &str, response: &str) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(key.to_string(), response.to_string());
    }

    /// The response used when no keyed response matches.
    pub fn set_default_response(&self, response: &str) {
        *self.default_response.lock().unwrap() = Some(response.to_string());
    }

    /// Makes every subsequent call fail with `GenerationError::AiApi`.
    pub fn fail_with_error(&self) {
        *self.failing.lock().unwrap() = true;
    }

    /// Makes every call sleep before answering.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Retrieves the recorded calls for assertion.
    pub fn get_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: GenerationOptions,
    ) -> Result<String, GenerationError> {
        self.calls.lock().unwrap().push(RecordedCall {
            system_prompt: system_prompt.to_string(),
            user_prompt: user_prompt.to_string(),
            options,
        });

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if *self.failing.lock().unwrap() {
            return Err(GenerationError::AiApi(
                "MockAiProvider: configured to fail".to_string(),
            ));
        }

        {
            let responses = self.responses.lock().unwrap();
            for (key, response) in responses.iter() {
                if user_prompt.contains(key) {
                    return Ok(response.clone());
                }
            }
        }

        self.default_response.lock().unwrap().clone().ok_or_else(|| {
            GenerationError::AiApi(format!(
                "MockAiProvider: No response programmed for user prompt. Got: '{user_prompt}'"
            ))
        })
    }
}

// --- Mock Document Collaborators ---

/// Serves canned bytes per file id.
#[derive(Clone, Debug, Default)]
pub struct MockDocumentSource {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    downloads: Arc<Mutex<Vec<String>>>,
}

impl MockDocumentSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, file_id: &str, bytes: &[u8]) {
        self.files
            .lock()
            .unwrap()
            .insert(file_id.to_string(), bytes.to_vec());
    }

    /// File ids requested so far.
    pub fn downloads(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentSource for MockDocumentSource {
    async fn download(&self, document: &DocumentRef) -> Result<Vec<u8>, TransportError> {
        self.downloads
            .lock()
            .unwrap()
            .push(document.file_id.clone());
        self.files
            .lock()
            .unwrap()
            .get(&document.file_id)
            .cloned()
            .ok_or_else(|| TransportError::Api(format!("file not found: {}", document.file_id)))
    }
}

/// Treats the document bytes as UTF-8 text.
#[derive(Clone, Debug, Default)]
pub struct MockTextExtractor {
    failing: Arc<Mutex<bool>>,
}

impl MockTextExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with_error(&self) {
        *self.failing.lock().unwrap() = true;
    }
}

#[async_trait]
impl TextExtractor for MockTextExtractor {
    async fn extract_text(&self, document: &[u8]) -> Result<String, ExtractionError> {
        if *self.failing.lock().unwrap() {
            return Err(ExtractionError::Parse(
                "MockTextExtractor: configured to fail".to_string(),
            ));
        }
        Ok(String::from_utf8_lossy(document).into_owned())
    }
}

// --- Mock Benchmark Source ---

#[derive(Clone, Debug, Default)]
pub struct MockBenchmarkSource {
    content: Arc<Mutex<Option<String>>>,
}

impl MockBenchmarkSource {
    /// A source that always returns `content`.
    pub fn with_content(content: &str) -> Self {
        Self {
            content: Arc::new(Mutex::new(Some(content.to_string()))),
        }
    }

    /// A source whose content block is never found.
    pub fn failing() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BenchmarkSource for MockBenchmarkSource {
    async fn fetch_benchmarks(&self) -> Result<String, FetchError> {
        self.content
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| FetchError::ContentNotFound(".benchmarks-content".to_string()))
    }
}

// --- Test-Specific Helpers ---

#[cfg(feature = "pdf")]
pub use helpers::minimal_text_pdf;

#[cfg(feature = "pdf")]
pub mod helpers {
    use anyhow::Result;
    use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str};
    use printpdf::{
        BuiltinFont, Layer, Mm, Op, ParsedFont, PdfDocument, PdfPage, PdfSaveOptions, Pt, TextItem,
        TextMatrix, TextRenderingMode,
    };

    /// Builds a small PDF whose pages each draw one line of text in the
    /// standard Helvetica font, so text extraction sees the literal strings.
    pub fn minimal_text_pdf(pages: &[&str]) -> Vec<u8> {
        let mut pdf = Pdf::new();

        let catalog_id = Ref::new(1);
        let page_tree_id = Ref::new(2);
        let font_id = Ref::new(3);
        let font_name = Name(b"F1");
        // Each page takes two ids: the page itself and its content stream.
        let page_ids: Vec<Ref> = (0..pages.len())
            .map(|i| Ref::new(4 + 2 * i as i32))
            .collect();

        pdf.catalog(catalog_id).pages(page_tree_id);
        pdf.pages(page_tree_id)
            .kids(page_ids.iter().copied())
            .count(pages.len() as i32);
        pdf.type1_font(font_id).base_font(Name(b"Helvetica"));

        for (text, page_id) in pages.iter().zip(&page_ids) {
            let content_id = Ref::new(page_id.get() + 1);

            let mut page = pdf.page(*page_id);
            page.media_box(Rect::new(0.0, 0.0, 612.0, 792.0));
            page.parent(page_tree_id);
            page.contents(content_id);
            page.resources().fonts().pair(font_name, font_id);
            page.finish();

            let mut content = Content::new();
            content.begin_text();
            content.set_font(font_name, 12.0);
            content.next_line(72.0, 720.0);
            content.show(Str(text.as_bytes()));
            content.end_text();
            pdf.stream(content_id, &content.finish());
        }

        pdf.finish()
    }

    /// Generates a PDF with one page per entry, compatible with printpdf v0.8.2.
    pub fn generate_test_pdf(pages: &[&str]) -> Result<Vec<u8>> {
        let mut doc = PdfDocument::new("Test PDF");
        let layer_def = Layer::new("Layer 1");
        let layer_id = doc.add_layer(&layer_def);

        // Get the font bytes for a built-in font and parse it.
        let font_bytes = BuiltinFont::Helvetica.get_subset_font().bytes;
        let font = ParsedFont::from_bytes(&font_bytes, 0, &mut Vec::new())
            .ok_or_else(|| anyhow::anyhow!("Failed to parse built-in font"))?;
        let font_id = doc.add_font(&font);

        for text in pages {
            let mut page = PdfPage::new(Mm(210.0), Mm(297.0), vec![]);
            page.ops = vec![
                Op::BeginLayer {
                    layer_id: layer_id.clone(),
                },
                Op::SetFontSize {
                    size: Pt(12.0),
                    font: font_id.clone(),
                },
                Op::StartTextSection,
                Op::SetTextMatrix {
                    matrix: TextMatrix::Translate(Mm(10.0).into(), Mm(280.0).into()),
                },
                Op::SetTextRenderingMode {
                    mode: TextRenderingMode::Fill,
                },
                Op::WriteText {
                    items: vec![TextItem::Text(text.to_string())],
                    font: font_id.clone(),
                },
                Op::EndTextSection,
                Op::EndLayer {
                    layer_id: layer_id.clone(),
                },
            ];
            doc.pages.push(page);
        }

        let mut warnings = Vec::new();
        let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            // In a test context, it's fine to just print warnings.
            eprintln!("PDF generation warnings: {warnings:?}");
        }

        Ok(bytes)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_minimal_text_pdf_layout() {
            let bytes = minimal_text_pdf(&["first", "second"]);
            let text = String::from_utf8_lossy(&bytes);

            assert!(text.starts_with("%PDF-"));
            assert!(text.contains("/BaseFont /Helvetica"));
            assert!(text.contains("/Count 2"));
            assert!(text.contains("(first) Tj"));
            assert!(text.contains("(second) Tj"));
        }
    }
}
