//! Document-query collaborator: ask a question against a collection, get an answer with sources.
//!
//! The conversation core only depends on the `DocumentQuery` trait; `HttpQueryClient` is the
//! network implementation.

mod http;

pub use http::HttpQueryClient;

use crate::message::Source;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Number of sources requested per query.
pub const RESULT_LIMIT: u32 = 5;

/// Parameters for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub user_id: String,
    pub query: String,
    /// Empty string when no collection is selected.
    pub collection_name: String,
    pub limit: u32,
}

/// Answer text plus the ordered sources it cites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<Source>,
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("query request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("query api error: {0}")]
    Api(String),
    #[error("query response could not be decoded: {0}")]
    Decode(String),
}

/// Asynchronous question answering over a document collection.
///
/// `Ok(None)` is an empty response; the controller treats it, like `Err`, as a failure.
#[async_trait]
pub trait DocumentQuery: Send + Sync {
    async fn query(&self, request: &QueryRequest) -> Result<Option<QueryResponse>, QueryError>;
}

#[async_trait]
impl<T: DocumentQuery + ?Sized> DocumentQuery for std::sync::Arc<T> {
    async fn query(&self, request: &QueryRequest) -> Result<Option<QueryResponse>, QueryError> {
        (**self).query(request).await
    }
}
