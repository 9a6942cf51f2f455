//! # Shared Constants
//!
//! User-facing strings and limits shared by the conversation controller, the
//! stateless commands and the transport. Keeping them here avoids "magic strings"
//! drifting apart between the code that sends a message and the tests that expect it.

/// Maximum number of characters a single outbound chat message may carry.
pub const MESSAGE_CHUNK_LIMIT: usize = 4000;

/// How many keyword lines are shown when the upload branch is disabled.
pub const KEYWORD_SAMPLE_SIZE: usize = 5;

/// The default page scraped by `/trends`.
pub const DEFAULT_BENCHMARK_URL: &str = "https://databox.com/ppc-industry-benchmarks";

/// The default CSS selector for the benchmark content block.
pub const DEFAULT_BENCHMARK_SELECTOR: &str = ".benchmarks-content";

// --- Conversation ---

pub const KEYWORDS_HEADER: &str = "Here are the trending keywords for your business:";
pub const REFINED_KEYWORDS_HEADER: &str = "Here are the refined keywords based on your document:";
pub const KEYWORDS_APOLOGY: &str = "Sorry, I couldn't generate keywords. Please try again later.";
pub const DOCUMENT_APOLOGY: &str = "Sorry, I couldn't read your document. Please try again later.";
pub const UPLOAD_QUESTION: &str =
    "Would you like to upload a document to refine these keywords? (yes/no)";
pub const UPLOAD_REQUEST: &str = "Please upload your document (PDF).";
pub const YES_NO_REPROMPT: &str = "Please respond with 'yes' or 'no'.";
pub const INVALID_DOCUMENT: &str = "Please upload a valid PDF document.";
pub const CLOSING_MESSAGE: &str =
    "Thank you for using the Business Assistant Bot. Good luck with your campaigns!";
pub const CANCELLED_MESSAGE: &str = "Operation cancelled.";

// --- Stateless commands ---

pub const TRENDS_HEADER: &str = "Here are the latest PPC trends:";
pub const TRENDS_APOLOGY: &str = "Sorry, I couldn't fetch the trends at the moment.";
pub const FAQ_USAGE: &str = "Please ask a question after the /faq command, like this:\n/faq How do I improve my ad performance?";
pub const FAQ_APOLOGY: &str = "Sorry, I couldn't process your question. Please try again later.";

pub const WELCOME_MESSAGE: &str = "Welcome to the Business Assistant Bot! I can help you with finding trendy keywords based on the answers you give me. Be ready, I will ask you questions below one by one.

Here are the commands you can use:
- To start, use: /start
- To know the trends in PPC and more: /trends
- To ask business-related questions: /faq
- To stop the current questionnaire: /cancel

Let's get started!";
