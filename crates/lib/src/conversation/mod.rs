//! # Conversation Controller
//!
//! Drives one questionnaire per session: looks up the session, applies the
//! transition table from [`state`], performs the side effect the table asks for
//! (storing an answer, generating keywords, refining from a document) and persists
//! or deletes the session.
//!
//! Every operation holds the session's lock from lookup to store, including any
//! call to the AI provider or the document collaborators, so two messages for the
//! same session can never interleave. Distinct sessions proceed independently.

pub mod state;

pub use state::{parse_yes_no, transition, Action, Event, State, Transition};

use crate::{
    constants::{
        CANCELLED_MESSAGE, DOCUMENT_APOLOGY, KEYWORDS_APOLOGY, KEYWORDS_HEADER,
        KEYWORD_SAMPLE_SIZE, REFINED_KEYWORDS_HEADER, UPLOAD_QUESTION,
    },
    errors::{BuildError, DocumentError},
    prompts::{
        build_keyword_prompt, build_refinement_prompt, keyword_options, sample_lines,
        KEYWORD_SYSTEM_PROMPT,
    },
    providers::{
        ai::AiProvider,
        document::{DocumentSource, TextExtractor},
    },
    session::{CollectedFields, Field, InMemorySessionStore, Session, SessionLocks, SessionStore},
    types::{DocumentRef, SessionId},
};
use std::{fmt, sync::Arc};
use tracing::{debug, error, info, instrument, warn};

/// What the controller did with an inbound event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reply {
    /// The session's state after the event. `None` when no session existed and
    /// the event was ignored.
    pub state: Option<State>,
    /// Messages to send back, in order.
    pub messages: Vec<String>,
}

impl Reply {
    fn new(state: State, messages: Vec<String>) -> Self {
        Self {
            state: Some(state),
            messages,
        }
    }

    fn ignored() -> Self {
        Self::default()
    }
}

/// The conversation state machine.
pub struct Conversation {
    store: Arc<dyn SessionStore>,
    locks: SessionLocks,
    ai_provider: Arc<dyn AiProvider>,
    documents: Option<Arc<dyn DocumentSource>>,
    extractor: Option<Arc<dyn TextExtractor>>,
    upload_branch: bool,
}

impl fmt::Debug for Conversation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conversation")
            .field("ai_provider", &self.ai_provider)
            .field("upload_branch", &self.upload_branch)
            .finish_non_exhaustive()
    }
}

impl Conversation {
    pub fn builder() -> ConversationBuilder {
        ConversationBuilder::new()
    }

    /// Starts (or restarts) the questionnaire for `id`.
    ///
    /// Any previous session for the same id is replaced, not merged.
    #[instrument(skip_all, fields(session = %id))]
    pub async fn begin_session(&self, id: &SessionId) -> Reply {
        let _guard = self.locks.acquire(id).await;
        let session = Session::new(id.clone());
        let state = session.state;
        self.store.put(session).await;
        info!("Session started");
        Reply::new(state, state.prompt().map(String::from).into_iter().collect())
    }

    /// Applies a text answer to the current question.
    pub async fn advance(&self, id: &SessionId, input: &str) -> Reply {
        self.handle(id, Event::Text(input.to_string())).await
    }

    /// Applies an uploaded document.
    pub async fn submit_document(&self, id: &SessionId, document: DocumentRef) -> Reply {
        self.handle(id, Event::Document(document)).await
    }

    /// Ends the conversation unconditionally.
    pub async fn cancel(&self, id: &SessionId) -> Reply {
        self.handle(id, Event::Cancel).await
    }

    /// Applies any in-conversation event.
    #[instrument(skip_all, fields(session = %id))]
    pub async fn handle(&self, id: &SessionId, event: Event) -> Reply {
        let _guard = self.locks.acquire(id).await;

        let Some(mut session) = self.store.get(id).await else {
            return match event {
                Event::Cancel => Reply::new(State::End, vec![CANCELLED_MESSAGE.to_string()]),
                _ => {
                    debug!("No active session; event ignored");
                    Reply::ignored()
                }
            };
        };

        let from = session.state;
        let Transition { next, action } = transition(from, event, self.upload_branch);
        debug!(?from, ?next, "Applying transition");

        let messages = match action {
            Action::Record { field, value } => {
                session.fields.set(field, value);
                next.prompt().map(String::from).into_iter().collect()
            }
            Action::GenerateKeywords {
                location,
                follow_up,
            } => {
                session.fields.set(Field::Location, location);
                let keywords = self.generate_keywords(&session.fields, !follow_up).await;
                let mut messages = vec![keywords];
                if follow_up {
                    messages.push(UPLOAD_QUESTION.to_string());
                }
                messages
            }
            Action::RefineFromDocument(document) => {
                vec![self.refine_from_document(&document).await]
            }
            Action::Say(message) => vec![message.to_string()],
            Action::Ignore => Vec::new(),
        };

        session.state = next;
        if next.is_terminal() {
            self.store.delete(id).await;
            info!(?from, "Session ended");
        } else {
            self.store.put(session).await;
        }

        Reply::new(next, messages)
    }

    /// The current state of `id`, or `None` outside a conversation.
    pub async fn state_of(&self, id: &SessionId) -> Option<State> {
        self.store.get(id).await.map(|s| s.state)
    }

    /// A snapshot of the session for `id`.
    pub async fn session(&self, id: &SessionId) -> Option<Session> {
        self.store.get(id).await
    }

    async fn generate_keywords(&self, fields: &CollectedFields, sample: bool) -> String {
        let prompt = build_keyword_prompt(fields);
        match self
            .ai_provider
            .generate(KEYWORD_SYSTEM_PROMPT, &prompt, keyword_options())
            .await
        {
            Ok(keywords) => format!("{KEYWORDS_HEADER}\n{}", present(&keywords, sample)),
            Err(e) => {
                error!("Keyword generation failed: {e}");
                KEYWORDS_APOLOGY.to_string()
            }
        }
    }

    async fn refine_from_document(&self, document: &DocumentRef) -> String {
        let text = match self.read_document(document).await {
            Ok(text) => text,
            Err(e) => {
                error!(file_id = %document.file_id, "Document could not be read: {e}");
                return DOCUMENT_APOLOGY.to_string();
            }
        };

        let prompt = build_refinement_prompt(&text);
        match self
            .ai_provider
            .generate(KEYWORD_SYSTEM_PROMPT, &prompt, keyword_options())
            .await
        {
            Ok(keywords) => format!("{REFINED_KEYWORDS_HEADER}\n{keywords}"),
            Err(e) => {
                error!("Keyword refinement failed: {e}");
                KEYWORDS_APOLOGY.to_string()
            }
        }
    }

    async fn read_document(&self, document: &DocumentRef) -> Result<String, DocumentError> {
        let (Some(documents), Some(extractor)) = (&self.documents, &self.extractor) else {
            return Err(DocumentError::Unsupported);
        };
        let bytes = documents.download(document).await?;
        debug!(bytes = bytes.len(), "Document downloaded");
        let text = extractor.extract_text(&bytes).await?;
        if text.trim().is_empty() {
            warn!(file_id = %document.file_id, "Document has no extractable text");
            return Err(DocumentError::Empty);
        }
        Ok(text)
    }
}

/// Formats generated keywords; `sample` keeps only a random handful of lines.
fn present(keywords: &str, sample: bool) -> String {
    if sample {
        sample_lines(keywords, KEYWORD_SAMPLE_SIZE, &mut rand::rng()).join("\n")
    } else {
        keywords.to_string()
    }
}

/// A builder for `Conversation`.
#[derive(Default)]
pub struct ConversationBuilder {
    store: Option<Arc<dyn SessionStore>>,
    ai_provider: Option<Arc<dyn AiProvider>>,
    documents: Option<Arc<dyn DocumentSource>>,
    extractor: Option<Arc<dyn TextExtractor>>,
    upload_branch: bool,
}

impl ConversationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the session store. Defaults to an `InMemorySessionStore`.
    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn ai_provider(mut self, ai_provider: Arc<dyn AiProvider>) -> Self {
        self.ai_provider = Some(ai_provider);
        self
    }

    pub fn document_source(mut self, documents: Arc<dyn DocumentSource>) -> Self {
        self.documents = Some(documents);
        self
    }

    pub fn text_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Enables the document-refinement branch after keyword generation.
    pub fn upload_branch(mut self, enabled: bool) -> Self {
        self.upload_branch = enabled;
        self
    }

    /// Builds the `Conversation`.
    ///
    /// The upload branch needs both a document source and a text extractor.
    pub fn build(self) -> Result<Conversation, BuildError> {
        let ai_provider = self.ai_provider.ok_or(BuildError::MissingAiProvider)?;
        if self.upload_branch && (self.documents.is_none() || self.extractor.is_none()) {
            return Err(BuildError::MissingDocumentCollaborators);
        }
        Ok(Conversation {
            store: self
                .store
                .unwrap_or_else(|| Arc::new(InMemorySessionStore::new())),
            locks: SessionLocks::new(),
            ai_provider,
            documents: self.documents,
            extractor: self.extractor,
            upload_branch: self.upload_branch,
        })
    }
}
