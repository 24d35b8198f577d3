//! Conversation controller: one request/response cycle per submission.
//!
//! Submit appends the user's message, queries the document backend, then appends the answer
//! (or a fixed apology). Failures never escape `submit`; they are logged and, except for a
//! missing user, shown as an assistant message.

use crate::config::PanelConfig;
use crate::credentials::CredentialLookup;
use crate::keyboard::KeyboardHub;
use crate::message::{IdGenerator, Message};
use crate::query::{DocumentQuery, QueryError, QueryRequest, RESULT_LIMIT};
use crate::scroll::ScrollRequest;
use crate::session::{Session, SessionView};
use crate::visibility::{CloseCallback, Visibility};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Shown when the backend answers with nothing.
pub const EMPTY_RESPONSE_TEXT: &str = "Sorry, I couldn't process your request. Please try again.";
/// Shown when the query fails.
pub const QUERY_FAILURE_TEXT: &str = "Sorry, there was an error processing your request.";

#[derive(Debug, thiserror::Error)]
pub enum ConversationError {
    #[error("no authenticated user")]
    AuthMissing,
    #[error("query returned an empty response")]
    EmptyResponse,
    #[error("query failed: {0}")]
    QueryFailure(#[from] QueryError),
}

impl ConversationError {
    /// Text of the assistant bubble for this failure; `None` when nothing is shown.
    pub fn apology(&self) -> Option<&'static str> {
        match self {
            ConversationError::AuthMissing => None,
            ConversationError::EmptyResponse => Some(EMPTY_RESPONSE_TEXT),
            ConversationError::QueryFailure(_) => Some(QUERY_FAILURE_TEXT),
        }
    }
}

/// Which branch a submission took.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Answer appended with this many sources.
    Answered { sources: usize },
    /// Apology appended.
    Apologized(ConversationError),
    /// Nothing appended (no user).
    Rejected(ConversationError),
    /// The response arrived after the panel closed; dropped.
    Discarded,
}

impl SubmitOutcome {
    pub fn is_answered(&self) -> bool {
        matches!(self, SubmitOutcome::Answered { .. })
    }
}

pub struct ConversationController<C, Q> {
    credentials: C,
    query: Q,
    ids: IdGenerator,
    keyboard: KeyboardHub,
    opening_transition: Duration,
    session: Arc<RwLock<Session>>,
}

impl<C, Q> ConversationController<C, Q>
where
    C: CredentialLookup,
    Q: DocumentQuery,
{
    /// Create the controller and its session. The panel starts closed.
    pub fn new(
        credentials: C,
        query: Q,
        panel: &PanelConfig,
        keyboard: KeyboardHub,
        on_close: CloseCallback,
    ) -> Self {
        let session = Session::new(panel, keyboard.clone(), on_close);
        Self {
            credentials,
            query,
            ids: IdGenerator::new(),
            keyboard,
            opening_transition: Duration::from_millis(panel.opening_transition_ms),
            session: Arc::new(RwLock::new(session)),
        }
    }

    /// Submit a question. Overlapping calls proceed independently: each appends its own answer
    /// when its response arrives, and the session stays loading until all of them have. A
    /// response that arrives after the panel was closed is discarded.
    pub async fn submit(&self, content: impl Into<String>) -> SubmitOutcome {
        let content = content.into();
        let Some(user_id) = self.credentials.user_id() else {
            log::warn!("submit: no authenticated user; message not sent");
            return SubmitOutcome::Rejected(ConversationError::AuthMissing);
        };

        let (ticket, collection_name) = {
            let mut s = self.session.write().await;
            s.append(Message::user(self.ids.next_id(), content.clone()));
            (s.begin_request(), s.collection_name())
        };

        let request = QueryRequest {
            user_id,
            query: content,
            collection_name,
            limit: RESULT_LIMIT,
        };
        let result = self.query.query(&request).await;

        let mut s = self.session.write().await;
        if !s.finish_request(ticket) {
            log::debug!("submit: response from generation {} arrived after close; discarded", ticket);
            return SubmitOutcome::Discarded;
        }
        match result {
            Ok(Some(response)) => {
                let count = response.sources.len();
                s.append(Message::assistant(
                    self.ids.next_id(),
                    response.answer,
                    Some(response.sources),
                ));
                SubmitOutcome::Answered { sources: count }
            }
            Ok(None) => {
                let err = ConversationError::EmptyResponse;
                log::warn!("submit: {}", err);
                s.append(Message::assistant(self.ids.next_id(), EMPTY_RESPONSE_TEXT, None));
                SubmitOutcome::Apologized(err)
            }
            Err(e) => {
                let err = ConversationError::from(e);
                log::warn!("submit: {}", err);
                s.append(Message::assistant(self.ids.next_id(), QUERY_FAILURE_TEXT, None));
                SubmitOutcome::Apologized(err)
            }
        }
    }

    /// Apply an externally driven visibility change. When this leaves the panel open with a
    /// pending message that has not been sent yet, it is submitted before returning.
    pub async fn set_visibility(&self, next: Visibility) -> Option<SubmitOutcome> {
        let pending = {
            let mut s = self.session.write().await;
            s.set_visibility(next);
            s.take_pending_submission()
        };
        self.submit_pending(pending).await
    }

    /// Closed -> opening -> open, holding `opening` for the configured transition window.
    pub async fn open_with_transition(&self) -> Option<SubmitOutcome> {
        self.set_visibility(Visibility::Opening).await;
        if !self.opening_transition.is_zero() {
            tokio::time::sleep(self.opening_transition).await;
        }
        self.set_visibility(Visibility::Open).await
    }

    pub async fn close(&self) {
        self.set_visibility(Visibility::Closed).await;
    }

    /// Explicit close action: runs the caller's close callback.
    pub async fn request_close(&self) {
        self.session.read().await.visibility_controller().request_close();
    }

    /// Replace the pending message; submits it if the panel is open and the value is new.
    pub async fn set_pending_message(&self, message: Option<String>) -> Option<SubmitOutcome> {
        let pending = {
            let mut s = self.session.write().await;
            s.set_pending_message(message);
            s.take_pending_submission()
        };
        self.submit_pending(pending).await
    }

    pub async fn set_selected_collection(&self, collection: Option<String>) {
        self.session.write().await.set_selected_collection(collection);
    }

    async fn submit_pending(&self, pending: Option<String>) -> Option<SubmitOutcome> {
        let message = pending?;
        log::info!("submitting pending message ({} chars)", message.chars().count());
        Some(self.submit(message).await)
    }

    pub async fn view(&self) -> SessionView {
        self.session.read().await.view()
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.session.read().await.store().as_slice().to_vec()
    }

    pub async fn is_loading(&self) -> bool {
        self.session.read().await.is_loading()
    }

    pub async fn visibility(&self) -> Visibility {
        self.session.read().await.visibility()
    }

    pub async fn take_scroll_request(&self) -> Option<ScrollRequest> {
        self.session.write().await.take_scroll_request()
    }

    pub async fn last_user_index(&self) -> Option<usize> {
        self.session.read().await.grouper().last_user_index()
    }

    pub async fn last_assistant_index(&self) -> Option<usize> {
        self.session.read().await.grouper().last_assistant_index()
    }

    /// Hub that receives the host's key presses.
    pub fn keyboard(&self) -> &KeyboardHub {
        &self.keyboard
    }
}
