//! Citechat core library: the conversation controller behind an embeddable document-chat panel,
//! plus its collaborators (message history, bubble grouping, scrolling, visibility, queries).

pub mod config;
pub mod controller;
pub mod credentials;
pub mod grouping;
pub mod init;
pub mod keyboard;
pub mod message;
pub mod query;
pub mod scroll;
pub mod session;
pub mod store;
pub mod visibility;

pub use controller::{ConversationController, ConversationError, SubmitOutcome};
