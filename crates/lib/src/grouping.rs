//! Bubble grouping: which message is the newest from each sender.
//!
//! The last user index and last assistant index are kept up to date on every append,
//! so classifying a message never rescans the history.

use crate::message::Message;
use crate::store::MessageStore;

/// Corner styling of a bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleCorner {
    /// Newest message from its sender.
    Trailing,
    Rounded,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BubbleGrouper {
    last_user: Option<usize>,
    last_assistant: Option<usize>,
}

impl BubbleGrouper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an existing store (one pass).
    pub fn from_store(store: &MessageStore) -> Self {
        let mut grouper = Self::new();
        for (index, message) in store.iter().enumerate() {
            grouper.observe(index, message);
        }
        grouper
    }

    /// Record a message appended at `index`. Indices must be observed in append order.
    pub fn observe(&mut self, index: usize, message: &Message) {
        if message.is_user() {
            self.last_user = Some(index);
        } else {
            self.last_assistant = Some(index);
        }
    }

    pub fn last_user_index(&self) -> Option<usize> {
        self.last_user
    }

    pub fn last_assistant_index(&self) -> Option<usize> {
        self.last_assistant
    }

    pub fn corner(&self, index: usize, message: &Message) -> BubbleCorner {
        let last = if message.is_user() {
            self.last_user
        } else {
            self.last_assistant
        };
        if last == Some(index) {
            BubbleCorner::Trailing
        } else {
            BubbleCorner::Rounded
        }
    }

    /// Corner for every message in the store, in order.
    pub fn classify(&self, store: &MessageStore) -> Vec<BubbleCorner> {
        store
            .iter()
            .enumerate()
            .map(|(index, message)| self.corner(index, message))
            .collect()
    }
}
