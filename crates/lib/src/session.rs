//! Chat panel session: message history plus the state derived from it.
//!
//! One session lives from the first time the panel is shown until it is dropped. Nothing is
//! persisted; the history goes away with the session.

use crate::config::PanelConfig;
use crate::grouping::{BubbleCorner, BubbleGrouper};
use crate::keyboard::KeyboardHub;
use crate::message::Message;
use crate::scroll::{ScrollManager, ScrollRequest};
use crate::store::MessageStore;
use crate::visibility::{CloseCallback, Visibility, VisibilityController};

/// Unique session identifier (opaque string).
pub type SessionId = String;

/// Snapshot handed to the presentation layer.
#[derive(Debug, Clone)]
pub struct SessionView {
    pub session_id: SessionId,
    pub messages: Vec<Message>,
    /// One entry per message, same order.
    pub corners: Vec<BubbleCorner>,
    pub is_loading: bool,
    pub visibility: Visibility,
}

pub struct Session {
    id: SessionId,
    store: MessageStore,
    grouper: BubbleGrouper,
    scroll: ScrollManager,
    visibility: VisibilityController,
    /// Requests of the current generation that have not completed yet.
    outstanding: usize,
    /// Advanced when the panel closes; a completion only lands when its ticket is still current.
    generation: u64,
    selected_collection: Option<String>,
    pending_message: Option<String>,
    last_auto_submitted: Option<String>,
}

impl Session {
    pub fn new(panel: &PanelConfig, keyboard: KeyboardHub, on_close: CloseCallback) -> Self {
        let id = format!("sess-{}", uuid::Uuid::new_v4());
        log::debug!("session {} created", id);
        Self {
            id,
            store: MessageStore::new(),
            grouper: BubbleGrouper::new(),
            scroll: ScrollManager::new(),
            visibility: VisibilityController::new(keyboard, on_close),
            outstanding: 0,
            generation: 0,
            selected_collection: panel.selected_collection.clone(),
            pending_message: panel.pending_message.clone(),
            last_auto_submitted: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    pub fn grouper(&self) -> &BubbleGrouper {
        &self.grouper
    }

    /// True while at least one request is in flight.
    pub fn is_loading(&self) -> bool {
        self.outstanding > 0
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility.state()
    }

    pub fn visibility_controller(&self) -> &VisibilityController {
        &self.visibility
    }

    /// Collection used to scope queries; empty when none is selected.
    pub fn collection_name(&self) -> String {
        self.selected_collection.clone().unwrap_or_default()
    }

    pub fn set_selected_collection(&mut self, collection: Option<String>) {
        self.selected_collection = collection;
    }

    pub fn set_pending_message(&mut self, message: Option<String>) {
        self.pending_message = message;
    }

    /// Append a message and let grouping and scrolling react to it.
    pub fn append(&mut self, message: Message) -> usize {
        let index = self.store.append(message);
        if let Some(m) = self.store.at(index) {
            self.grouper.observe(index, m);
        }
        self.scroll
            .on_messages_changed(self.store.len(), self.visibility.state());
        index
    }

    /// Start a request: returns its ticket and marks the session loading.
    pub fn begin_request(&mut self) -> u64 {
        self.outstanding += 1;
        self.generation
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        ticket == self.generation
    }

    /// Finish a request. Returns false (and leaves the session untouched) for tickets issued
    /// before the panel was last closed.
    pub fn finish_request(&mut self, ticket: u64) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.outstanding = self.outstanding.saturating_sub(1);
        true
    }

    /// Apply a visibility change; returns the previous state. Closing invalidates every request
    /// still in flight.
    pub fn set_visibility(&mut self, next: Visibility) -> Visibility {
        let prev = self.visibility.transition(next);
        if next == Visibility::Closed && prev != Visibility::Closed {
            self.generation += 1;
            if self.outstanding > 0 {
                log::debug!(
                    "session {}: closed with {} request(s) in flight; dropping them",
                    self.id,
                    self.outstanding
                );
            }
            self.outstanding = 0;
        }
        prev
    }

    /// The pending message to auto-submit now, if the panel is open and this value has not been
    /// submitted yet. Marks it submitted.
    pub fn take_pending_submission(&mut self) -> Option<String> {
        if !self.visibility.is_open() {
            return None;
        }
        let pending = self
            .pending_message
            .as_ref()
            .filter(|m| !m.is_empty())?;
        if self.last_auto_submitted.as_ref() == Some(pending) {
            return None;
        }
        self.last_auto_submitted = Some(pending.clone());
        Some(pending.clone())
    }

    pub fn take_scroll_request(&mut self) -> Option<ScrollRequest> {
        self.scroll.take_request()
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id.clone(),
            messages: self.store.as_slice().to_vec(),
            corners: self.grouper.classify(&self.store),
            is_loading: self.is_loading(),
            visibility: self.visibility.state(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::IdGenerator;
    use std::sync::Arc;

    fn session(pending: Option<&str>) -> Session {
        let panel = PanelConfig {
            pending_message: pending.map(str::to_string),
            ..PanelConfig::default()
        };
        Session::new(&panel, KeyboardHub::new(), Arc::new(|| {}))
    }

    #[test]
    fn session_ids_are_prefixed() {
        assert!(session(None).id().starts_with("sess-"));
    }

    #[test]
    fn loading_until_every_request_finishes() {
        let mut s = session(None);
        let first = s.begin_request();
        let second = s.begin_request();
        assert!(s.finish_request(second));
        assert!(s.is_loading());
        assert!(s.finish_request(first));
        assert!(!s.is_loading());
    }

    #[test]
    fn closing_invalidates_and_clears_loading() {
        let mut s = session(None);
        s.set_visibility(Visibility::Open);
        let ticket = s.begin_request();
        s.set_visibility(Visibility::Closed);
        assert!(!s.is_loading());
        assert!(!s.finish_request(ticket));
    }

    #[test]
    fn only_close_invalidates() {
        let mut s = session(None);
        s.set_visibility(Visibility::Open);
        let ticket = s.begin_request();
        s.set_visibility(Visibility::Opening);
        assert!(s.is_loading());
        assert!(s.finish_request(ticket));
        assert!(!s.is_loading());
    }

    #[test]
    fn pending_message_fires_once_per_value() {
        let mut s = session(Some("Summarize Q3 earnings"));
        assert_eq!(s.take_pending_submission(), None);
        s.set_visibility(Visibility::Open);
        assert_eq!(s.take_pending_submission().as_deref(), Some("Summarize Q3 earnings"));
        assert_eq!(s.take_pending_submission(), None);

        s.set_visibility(Visibility::Closed);
        s.set_visibility(Visibility::Open);
        assert_eq!(s.take_pending_submission(), None);

        s.set_pending_message(Some("Compare margins".to_string()));
        assert_eq!(s.take_pending_submission().as_deref(), Some("Compare margins"));
    }

    #[test]
    fn empty_pending_message_is_skipped() {
        let mut s = session(Some(""));
        s.set_visibility(Visibility::Open);
        assert_eq!(s.take_pending_submission(), None);
    }

    #[test]
    fn whitespace_pending_message_is_submitted_once() {
        let mut s = session(Some("  "));
        s.set_visibility(Visibility::Open);
        assert_eq!(s.take_pending_submission().as_deref(), Some("  "));
        assert_eq!(s.take_pending_submission(), None);
    }

    #[test]
    fn view_reports_corners_and_scroll() {
        let ids = IdGenerator::new();
        let mut s = session(None);
        s.set_visibility(Visibility::Open);
        s.append(Message::user(ids.next_id(), "q"));
        s.append(Message::assistant(ids.next_id(), "a", None));
        let view = s.view();
        assert_eq!(view.messages.len(), 2);
        assert_eq!(view.corners, vec![BubbleCorner::Trailing, BubbleCorner::Trailing]);
        assert_eq!(s.take_scroll_request().map(|r| r.target_index), Some(1));
    }
}
