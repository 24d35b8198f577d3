//! Chat messages and the citation sources attached to assistant answers.
//!
//! Messages are created once and never edited: id, sender and content are fixed at construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Number of sources a message bubble shows; the stored list is never truncated.
pub const MAX_DISPLAY_SOURCES: usize = 3;

/// Message identifier, unique within a session and increasing in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(u64);

impl MessageId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg-{}", self.0)
    }
}

/// Hands out message ids. Shared by every submission of a session, so overlapping
/// submissions still get distinct, ordered ids.
#[derive(Debug, Default)]
pub struct IdGenerator {
    next: AtomicU64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> MessageId {
        MessageId(self.next.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

/// Bubble kind. Only `Plain` is produced by the conversation core; `News` is reserved for cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Plain,
    News,
}

/// A citation excerpt returned alongside an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub content: String,
    pub data_type: String,
    pub collection_name: String,
    /// Relevance confidence in [0, 1].
    pub score: f64,
}

impl Source {
    /// Score as a whole percentage for display (e.g. 0.92 -> 92).
    pub fn score_percent(&self) -> u32 {
        (self.score.clamp(0.0, 1.0) * 100.0).round() as u32
    }
}

/// A single entry in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    id: MessageId,
    content: String,
    is_user: bool,
    #[serde(default)]
    pub kind: MessageKind,
    /// Only set on assistant messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl Message {
    pub fn user(id: MessageId, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
            is_user: true,
            kind: MessageKind::Plain,
            sources: None,
            timestamp: Some(display_time()),
        }
    }

    pub fn assistant(id: MessageId, content: impl Into<String>, sources: Option<Vec<Source>>) -> Self {
        Self {
            id,
            content: content.into(),
            is_user: false,
            kind: MessageKind::Plain,
            sources,
            timestamp: Some(display_time()),
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_user(&self) -> bool {
        self.is_user
    }

    pub fn sources(&self) -> &[Source] {
        self.sources.as_deref().unwrap_or(&[])
    }

    /// Sources shown in the bubble: the first `MAX_DISPLAY_SOURCES`, in order.
    pub fn display_sources(&self) -> &[Source] {
        let all = self.sources();
        &all[..all.len().min(MAX_DISPLAY_SOURCES)]
    }
}

fn display_time() -> String {
    chrono::Local::now().format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(score: f64) -> Source {
        Source {
            content: "excerpt".to_string(),
            data_type: "filing".to_string(),
            collection_name: "10-K".to_string(),
            score,
        }
    }

    #[test]
    fn ids_increase_and_display_with_prefix() {
        let ids = IdGenerator::new();
        let a = ids.next_id();
        let b = ids.next_id();
        assert!(a < b);
        assert_eq!(a.to_string(), "msg-1");
        assert_eq!(b.to_string(), "msg-2");
    }

    #[test]
    fn display_sources_truncates_to_three() {
        let ids = IdGenerator::new();
        let sources: Vec<Source> = (0..5).map(|i| source(i as f64 / 10.0)).collect();
        let msg = Message::assistant(ids.next_id(), "answer", Some(sources));
        assert_eq!(msg.sources().len(), 5);
        assert_eq!(msg.display_sources().len(), 3);
        assert_eq!(msg.display_sources()[2].score, 0.2);
    }

    #[test]
    fn user_message_has_no_sources() {
        let msg = Message::user(IdGenerator::new().next_id(), "hi");
        assert!(msg.is_user());
        assert!(msg.sources().is_empty());
        assert!(msg.display_sources().is_empty());
        assert_eq!(msg.kind, MessageKind::Plain);
    }

    #[test]
    fn kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&MessageKind::News).unwrap(), "\"news\"");
    }

    #[test]
    fn score_percent_rounds() {
        assert_eq!(source(0.92).score_percent(), 92);
        assert_eq!(source(1.7).score_percent(), 100);
    }
}
