use crate::errors::FetchError;
use async_trait::async_trait;

/// Supplies the industry benchmark text shown by `/trends`.
#[async_trait]
pub trait BenchmarkSource: Send + Sync {
    /// Fetches the page and returns the extracted content block as text.
    async fn fetch_benchmarks(&self) -> Result<String, FetchError>;
}
