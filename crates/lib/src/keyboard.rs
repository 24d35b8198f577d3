//! Global key listeners: subscribe a handler, dispatch key presses to every live handler.
//!
//! A `KeySubscription` removes its handler when dropped, so a listener never outlives its owner.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
    Char(char),
    Other,
}

type Listener = Arc<dyn Fn(Key) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: AtomicU64,
    handlers: Mutex<HashMap<u64, Listener>>,
}

/// Shared registry of key listeners. Clones refer to the same registry.
#[derive(Clone, Default)]
pub struct KeyboardHub {
    inner: Arc<Listeners>,
}

impl KeyboardHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler; it stays attached until the returned subscription is dropped.
    pub fn subscribe<F>(&self, handler: F) -> KeySubscription
    where
        F: Fn(Key) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut g) = self.inner.handlers.lock() {
            g.insert(id, Arc::new(handler));
        }
        KeySubscription {
            id,
            hub: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver a key press to every attached handler once.
    pub fn dispatch(&self, key: Key) {
        // Snapshot first: a handler may detach listeners (including itself).
        let handlers: Vec<Listener> = match self.inner.handlers.lock() {
            Ok(g) => g.values().cloned().collect(),
            Err(_) => return,
        };
        for handler in handlers {
            handler(key);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.handlers.lock().map(|g| g.len()).unwrap_or(0)
    }
}

/// Handle to an attached listener.
pub struct KeySubscription {
    id: u64,
    hub: std::sync::Weak<Listeners>,
}

impl KeySubscription {
    pub fn detach(self) {}
}

impl Drop for KeySubscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            if let Ok(mut g) = hub.handlers.lock() {
                g.remove(&self.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn dispatch_reaches_subscribers_until_dropped() {
        let hub = KeyboardHub::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        let sub = hub.subscribe(move |key| {
            if key == Key::Escape {
                h.fetch_add(1, Ordering::SeqCst);
            }
        });
        hub.dispatch(Key::Escape);
        hub.dispatch(Key::Enter);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(hub.listener_count(), 1);

        sub.detach();
        assert_eq!(hub.listener_count(), 0);
        hub.dispatch(Key::Escape);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn handler_may_detach_during_dispatch() {
        let hub = KeyboardHub::new();
        let slot: Arc<Mutex<Option<KeySubscription>>> = Arc::new(Mutex::new(None));
        let s = slot.clone();
        let sub = hub.subscribe(move |_| {
            s.lock().unwrap().take();
        });
        *slot.lock().unwrap() = Some(sub);
        hub.dispatch(Key::Escape);
        assert_eq!(hub.listener_count(), 0);
    }
}
