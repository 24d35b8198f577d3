//! Integration test: serve a fake question-answering endpoint on a free port and drive the
//! HTTP client (and the controller on top of it) against it.

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use citechat::config::{PanelConfig, QueryConfig};
use citechat::controller::{ConversationController, QUERY_FAILURE_TEXT};
use citechat::credentials::StaticCredentials;
use citechat::keyboard::KeyboardHub;
use citechat::query::{DocumentQuery, HttpQueryClient, QueryError, QueryRequest};
use serde_json::{json, Value};
use std::sync::Arc;

async fn answer(Json(req): Json<Value>) -> Json<Value> {
    let collection = req.get("collection_name").and_then(|v| v.as_str()).unwrap_or("");
    let limit = req.get("limit").and_then(|v| v.as_u64()).unwrap_or(0);
    Json(json!({
        "answer": format!("answer to {}", req["query"].as_str().unwrap_or("")),
        "sources": [
            { "content": "10-K filing excerpt", "data_type": "filing", "collection_name": collection, "score": 0.92 },
            { "content": format!("limit {}", limit), "data_type": "note", "collection_name": collection, "score": 0.4 }
        ]
    }))
}

async fn empty() -> Json<Value> {
    Json(Value::Null)
}

async fn broken() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "index offline")
}

async fn serve() -> String {
    let app = Router::new()
        .route("/query", post(answer))
        .route("/empty", post(empty))
        .route("/broken", post(broken));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind free port");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{}", addr)
}

fn request(query: &str) -> QueryRequest {
    QueryRequest {
        user_id: "user-1".to_string(),
        query: query.to_string(),
        collection_name: "10-K".to_string(),
        limit: 5,
    }
}

#[tokio::test]
async fn decodes_answer_and_sources() {
    let base = serve().await;
    let client = HttpQueryClient::new(Some(base), None, None);
    let res = client
        .query(&request("What is AAPL trading at?"))
        .await
        .expect("query ok")
        .expect("non-empty response");
    assert_eq!(res.answer, "answer to What is AAPL trading at?");
    assert_eq!(res.sources.len(), 2);
    assert_eq!(res.sources[0].collection_name, "10-K");
    assert_eq!(res.sources[0].score, 0.92);
    assert_eq!(res.sources[1].content, "limit 5");
}

#[tokio::test]
async fn null_body_is_empty_response() {
    let base = serve().await;
    let client = HttpQueryClient::new(Some(base), Some("/empty".to_string()), None);
    let res = client.query(&request("Hello")).await.expect("query ok");
    assert!(res.is_none());
}

#[tokio::test]
async fn server_error_is_api_error() {
    let base = serve().await;
    let client = HttpQueryClient::new(Some(base), Some("/broken".to_string()), None);
    match client.query(&request("Hello")).await {
        Err(QueryError::Api(msg)) => assert!(msg.contains("index offline")),
        other => panic!("expected api error, got {:?}", other),
    }
}

#[tokio::test]
async fn controller_over_http() {
    let base = serve().await;
    let query_config = QueryConfig {
        base_url: base.clone(),
        ..QueryConfig::default()
    };
    let panel = PanelConfig {
        selected_collection: Some("10-K".to_string()),
        ..PanelConfig::default()
    };
    let c = ConversationController::new(
        StaticCredentials::new("user-1"),
        HttpQueryClient::from_config(&query_config),
        &panel,
        KeyboardHub::new(),
        Arc::new(|| {}),
    );
    assert!(c.submit("Summarize Q3 earnings").await.is_answered());

    let broken = ConversationController::new(
        StaticCredentials::new("user-1"),
        HttpQueryClient::new(Some(base), Some("/broken".to_string()), None),
        &panel,
        KeyboardHub::new(),
        Arc::new(|| {}),
    );
    broken.submit("Hello").await;

    let messages = c.messages().await;
    assert_eq!(messages[1].content(), "answer to Summarize Q3 earnings");
    assert_eq!(messages[1].sources().len(), 2);
    assert_eq!(broken.messages().await[1].content(), QUERY_FAILURE_TEXT);
}
