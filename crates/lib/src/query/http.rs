//! HTTP document-query client: POST the question as JSON, decode the answer.

use super::{DocumentQuery, QueryError, QueryRequest, QueryResponse};
use async_trait::async_trait;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_PATH: &str = "/query";

/// Client for a question-answering HTTP endpoint.
#[derive(Clone)]
pub struct HttpQueryClient {
    url: String,
    client: reqwest::Client,
}

impl HttpQueryClient {
    pub fn new(base_url: Option<String>, path: Option<String>, timeout: Option<Duration>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let path = path
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_PATH.to_string());
        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{}", path)
        };
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build().unwrap_or_else(|e| {
            log::warn!("query client: falling back to default http client: {}", e);
            reqwest::Client::new()
        });
        Self {
            url: format!("{}{}", base_url, path),
            client,
        }
    }

    pub fn from_config(config: &crate::config::QueryConfig) -> Self {
        Self::new(
            Some(config.base_url.clone()),
            Some(config.path.clone()),
            Some(Duration::from_secs(config.timeout_secs)),
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl DocumentQuery for HttpQueryClient {
    /// POST {url} with `{ user_id, query, collection_name, limit }`.
    async fn query(&self, request: &QueryRequest) -> Result<Option<QueryResponse>, QueryError> {
        log::debug!(
            "query: POST {} (collection {:?}, limit {})",
            self.url,
            request.collection_name,
            request.limit
        );
        let res = self.client.post(&self.url).json(request).send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(QueryError::Api(format!("{} {}", status, body)));
        }
        let text = res.text().await?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        let data: Option<QueryResponse> =
            serde_json::from_str(&text).map_err(|e| QueryError::Decode(e.to_string()))?;
        Ok(data)
    }
}
