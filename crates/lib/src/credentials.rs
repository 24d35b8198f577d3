//! Credential lookup: who is asking. Injected into the controller rather than read ad hoc.

use crate::config::{self, Config};

/// Synchronous lookup of the authenticated user id. `None` means nobody is signed in.
pub trait CredentialLookup: Send + Sync {
    fn user_id(&self) -> Option<String>;
}

/// Fixed user id (embedding hosts and tests).
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    user_id: Option<String>,
}

impl StaticCredentials {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self { user_id: None }
    }
}

impl CredentialLookup for StaticCredentials {
    fn user_id(&self) -> Option<String> {
        self.user_id.clone()
    }
}

/// Reads CITECHAT_USER_ID on every lookup, falling back to `auth.userId` from config.
#[derive(Debug, Clone)]
pub struct ConfigCredentials {
    config: Config,
}

impl ConfigCredentials {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl CredentialLookup for ConfigCredentials {
    fn user_id(&self) -> Option<String> {
        config::resolve_user_id(&self.config)
    }
}

impl<T: CredentialLookup + ?Sized> CredentialLookup for std::sync::Arc<T> {
    fn user_id(&self) -> Option<String> {
        (**self).user_id()
    }
}
