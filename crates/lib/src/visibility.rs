//! Panel lifecycle (closed / opening / open) and Escape-to-close.

use crate::keyboard::{Key, KeyboardHub, KeySubscription};
use std::fmt;
use std::sync::Arc;

/// Panel visibility. `Opening` only gates the enter animation and is followed by `Open`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Closed,
    Opening,
    Open,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Visibility::Closed => "closed",
            Visibility::Opening => "opening",
            Visibility::Open => "open",
        };
        f.write_str(s)
    }
}

/// Invoked on an explicit close action or Escape; expected to drive the panel back to closed.
pub type CloseCallback = Arc<dyn Fn() + Send + Sync>;

/// Tracks visibility and owns the Escape listener while the panel is open.
pub struct VisibilityController {
    state: Visibility,
    keyboard: KeyboardHub,
    on_close: CloseCallback,
    escape_listener: Option<KeySubscription>,
}

impl VisibilityController {
    pub fn new(keyboard: KeyboardHub, on_close: CloseCallback) -> Self {
        Self {
            state: Visibility::Closed,
            keyboard,
            on_close,
            escape_listener: None,
        }
    }

    pub fn state(&self) -> Visibility {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == Visibility::Open
    }

    /// Move to `next`; returns the previous state. The Escape listener is attached on entering
    /// `Open` and detached as soon as the state leaves it.
    pub fn transition(&mut self, next: Visibility) -> Visibility {
        let prev = self.state;
        self.state = next;
        if next == Visibility::Open {
            if self.escape_listener.is_none() {
                let on_close = self.on_close.clone();
                self.escape_listener = Some(self.keyboard.subscribe(move |key| {
                    if key == Key::Escape {
                        on_close();
                    }
                }));
            }
        } else if let Some(listener) = self.escape_listener.take() {
            listener.detach();
        }
        if prev != next {
            log::debug!("panel visibility: {} -> {}", prev, next);
        }
        prev
    }

    /// Explicit close action (e.g. the header's close button).
    pub fn request_close(&self) {
        (self.on_close)();
    }

    pub fn has_key_listener(&self) -> bool {
        self.escape_listener.is_some()
    }
}
