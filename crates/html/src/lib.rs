//! # adwise-html: Benchmark Page Scraping
//!
//! Fetches the PPC industry benchmark page, selects its content block by CSS
//! selector and converts it to compact Markdown for display in chat.

use adwise::{errors::FetchError, providers::benchmark::BenchmarkSource};
use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info, instrument};

static SCRIPT_STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style|noscript)\b[^>]*>.*?</(script|style|noscript)\s*>")
        .expect("static regex is valid")
});
static BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*(\n[ \t]*)+\n").expect("static regex is valid"));
static TRAILING_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)[ \t]+$").expect("static regex is valid"));

/// Removes `<script>`, `<style>` and `<noscript>` elements with their content.
pub fn clean_html(html: &str) -> String {
    SCRIPT_STYLE_RE.replace_all(html, "").into_owned()
}

/// Trims trailing whitespace on every line and collapses runs of blank lines.
pub fn clean_markdown_content(markdown: &str) -> String {
    let trimmed = TRAILING_SPACE_RE.replace_all(markdown, "");
    BLANK_LINES_RE
        .replace_all(&trimmed, "\n\n")
        .trim()
        .to_string()
}

/// Selects the first element matching `selector` and returns it as clean Markdown.
pub fn extract_block(html: &str, selector: &str) -> Result<String, FetchError> {
    let parsed_selector =
        Selector::parse(selector).map_err(|_| FetchError::InvalidSelector(selector.to_string()))?;
    let document = Html::parse_document(html);
    let block = document
        .select(&parsed_selector)
        .next()
        .ok_or_else(|| FetchError::ContentNotFound(selector.to_string()))?;

    let markdown = clean_markdown_content(&html2md::parse_html(&clean_html(&block.html())));
    if markdown.is_empty() {
        return Err(FetchError::ContentNotFound(selector.to_string()));
    }
    Ok(markdown)
}

/// Scrapes a benchmark page over HTTP.
#[derive(Debug, Clone)]
pub struct HtmlBenchmarkSource {
    client: reqwest::Client,
    url: String,
    selector: String,
}

impl HtmlBenchmarkSource {
    pub fn new(
        url: impl Into<String>,
        selector: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            url: url.into(),
            selector: selector.into(),
        })
    }
}

#[async_trait]
impl BenchmarkSource for HtmlBenchmarkSource {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch_benchmarks(&self) -> Result<String, FetchError> {
        info!("Fetching benchmark page");
        let response = self.client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status().as_u16(),
                url: self.url.clone(),
            });
        }
        let html = response.text().await?;
        debug!(bytes = html.len(), "Benchmark page downloaded");
        extract_block(&html, &self.selector)
    }
}
