use thiserror::Error;

/// Errors raised by an `AiProvider` while generating text.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to AI provider: {0}")]
    AiRequest(reqwest::Error),
    #[error("Failed to deserialize AI provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("AI provider returned an error: {0}")]
    AiApi(String),
    #[error("AI provider returned an empty response")]
    EmptyResponse,
}

/// Errors raised while turning an uploaded document into plain text.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Failed to parse document: {0}")]
    Parse(String),
    #[error("Extraction task failed: {0}")]
    Task(String),
}

/// Errors raised while fetching the industry benchmark page.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to fetch benchmark page: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Benchmark page '{url}' answered with status {status}")]
    Status { status: u16, url: String },
    #[error("No content block matching '{0}' was found")]
    ContentNotFound(String),
    #[error("Invalid CSS selector '{0}'")]
    InvalidSelector(String),
}

/// Errors raised by the chat transport.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to reach the chat API: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Chat API returned an error: {0}")]
    Api(String),
    #[error("Failed to deserialize chat API response: {0}")]
    Deserialization(String),
}

/// Why an uploaded document could not be turned into text.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Failed to download document: {0}")]
    Download(#[from] TransportError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error("Document contains no extractable text")]
    Empty,
    #[error("Document handling is not configured")]
    Unsupported,
}

/// Errors raised while assembling a `Conversation`.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BuildError {
    #[error("An AI provider is required")]
    MissingAiProvider,
    #[error("The upload branch needs a document source and a text extractor")]
    MissingDocumentCollaborators,
}
