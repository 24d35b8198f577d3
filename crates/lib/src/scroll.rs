//! Keeps the viewport pinned to the newest message.
//!
//! The core does not own the viewport; it records a pending request that the presentation
//! layer drains after rendering.

use crate::visibility::Visibility;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// Scroll to the end of the message list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    /// Index of the last message.
    pub target_index: usize,
    pub behavior: ScrollBehavior,
}

#[derive(Debug, Default)]
pub struct ScrollManager {
    last_len: usize,
    pending: Option<ScrollRequest>,
}

impl ScrollManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called after the message list changed. Requests a smooth scroll when the count moved
    /// and the panel is open; while closed or opening only the count is tracked.
    pub fn on_messages_changed(&mut self, len: usize, visibility: Visibility) -> bool {
        let changed = len != self.last_len;
        self.last_len = len;
        if !changed || len == 0 || visibility != Visibility::Open {
            return false;
        }
        self.pending = Some(ScrollRequest {
            target_index: len - 1,
            behavior: ScrollBehavior::Smooth,
        });
        true
    }

    pub fn pending(&self) -> Option<ScrollRequest> {
        self.pending
    }

    /// Take the pending request, if any.
    pub fn take_request(&mut self) -> Option<ScrollRequest> {
        self.pending.take()
    }
}
