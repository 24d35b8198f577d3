//! Append-only message history for one session.

use crate::message::Message;

/// Ordered record of the conversation. Entries are only ever pushed to the end.
#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message; returns its index.
    pub fn append(&mut self, message: Message) -> usize {
        self.messages.push(message);
        self.messages.len() - 1
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn at(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    /// Index of the last message matching `predicate`, scanning from the end.
    pub fn last_index_where<P>(&self, predicate: P) -> Option<usize>
    where
        P: Fn(&Message) -> bool,
    {
        self.messages.iter().rposition(predicate)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }
}
