//! Benchmark service client.
//!
//! `POST {base_url}/api/benchmarks/search` with a [`SearchPayload`] body.
//! Success returns `{"results": [...]}`; failures carry an optional
//! `{"detail": "..."}` body whose text becomes the user-visible message.
//!
//! Every request races a [`CancellationToken`]. Cancelling the token drops
//! the in-flight HTTP future and yields [`SearchError::Cancelled`].

use anyhow::Result;
use async_trait::async_trait;
use rigbench_core::models::SearchResponse;
use rigbench_core::request::SearchPayload;
use rigbench_core::sequencer::CancelHandle;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::BenchmarkConfig;

const DEFAULT_FAILURE: &str = "benchmark search failed";

#[derive(Debug, Error, PartialEq)]
pub enum SearchError {
    #[error("search cancelled")]
    Cancelled,
    #[error("benchmark service unreachable: {0}")]
    Transport(String),
    #[error("{} (HTTP {status})", .detail.as_deref().unwrap_or(DEFAULT_FAILURE))]
    Status { status: u16, detail: Option<String> },
    #[error("malformed benchmark response: {0}")]
    Malformed(String),
}

impl SearchError {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, SearchError::Cancelled)
    }
}

/// Seam between the search controller and the benchmark transport.
#[async_trait]
pub trait BenchmarkService: Send + Sync {
    async fn search(
        &self,
        payload: &SearchPayload,
        cancel: CancellationToken,
    ) -> Result<SearchResponse, SearchError>;
}

/// Cancel handle handed to the request sequencer.
#[derive(Debug, Clone, Default)]
pub struct SearchCancel(pub CancellationToken);

impl SearchCancel {
    pub fn new() -> Self {
        Self(CancellationToken::new())
    }

    pub fn token(&self) -> CancellationToken {
        self.0.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.is_cancelled()
    }
}

impl CancelHandle for SearchCancel {
    fn cancel(&self) {
        self.0.cancel();
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// Pull a message out of a `{"detail": ...}` error body.
///
/// Non-string details (validation error lists) are rendered as JSON.
fn error_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
        serde_json::Value::String(_) | serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

pub struct HttpBenchmarkService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBenchmarkService {
    pub fn new(config: &BenchmarkConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post(&self, payload: &SearchPayload) -> Result<SearchResponse, SearchError> {
        let url = format!("{}/api/benchmarks/search", self.base_url);
        debug!(%url, entries = payload.hardware.len(), "posting benchmark search");

        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| SearchError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                detail: error_detail(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| SearchError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl BenchmarkService for HttpBenchmarkService {
    async fn search(
        &self,
        payload: &SearchPayload,
        cancel: CancellationToken,
    ) -> Result<SearchResponse, SearchError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SearchError::Cancelled),
            result = self.post(payload) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigbench_core::request::SearchConfiguration;

    #[test]
    fn test_error_detail_extraction() {
        assert_eq!(
            error_detail(r#"{"detail": "Game not found"}"#).as_deref(),
            Some("Game not found")
        );
        assert_eq!(error_detail(r#"{"detail": ""}"#), None);
        assert_eq!(error_detail("<html>bad gateway</html>"), None);
        assert_eq!(
            error_detail(r#"{"detail": [{"msg": "field required"}]}"#).as_deref(),
            Some(r#"[{"msg":"field required"}]"#)
        );
    }

    #[test]
    fn test_status_error_message_prefers_detail() {
        let err = SearchError::Status {
            status: 404,
            detail: Some("Game not found".into()),
        };
        assert_eq!(err.to_string(), "Game not found (HTTP 404)");

        let err = SearchError::Status {
            status: 502,
            detail: None,
        };
        assert_eq!(err.to_string(), "benchmark search failed (HTTP 502)");
        assert!(!err.is_cancellation());
        assert!(SearchError::Cancelled.is_cancellation());
    }

    #[test]
    fn test_search_cancel_handle() {
        let handle = SearchCancel::new();
        let token = handle.token();
        assert!(!token.is_cancelled());
        CancelHandle::cancel(&handle);
        assert!(token.is_cancelled());
        assert!(handle.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_token_short_circuits() {
        let service = HttpBenchmarkService::new(&BenchmarkConfig {
            base_url: "http://127.0.0.1:9".into(),
            timeout_secs: 5,
        })
        .unwrap();
        let token = CancellationToken::new();
        token.cancel();
        let payload = SearchConfiguration::default().to_payload();
        let err = service.search(&payload, token).await.unwrap_err();
        assert_eq!(err, SearchError::Cancelled);
    }

    /// Local server that accepts one connection and never answers.
    async fn stalled_server() -> (String, tokio::sync::oneshot::Receiver<()>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (accepted_tx, accepted_rx) = tokio::sync::oneshot::channel();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            let _ = accepted_tx.send(());
            std::future::pending::<()>().await;
        });
        (format!("http://{}", addr), accepted_rx)
    }

    #[tokio::test]
    async fn test_cancel_drops_in_flight_request() {
        let (base_url, accepted) = stalled_server().await;
        let service = HttpBenchmarkService::new(&BenchmarkConfig {
            base_url,
            timeout_secs: 60,
        })
        .unwrap();
        let token = CancellationToken::new();
        let payload = SearchConfiguration::default().to_payload();

        let request = {
            let token = token.clone();
            tokio::spawn(async move { service.search(&payload, token).await })
        };
        accepted.await.unwrap();
        assert!(!request.is_finished());

        token.cancel();
        let result = tokio::time::timeout(Duration::from_secs(5), request)
            .await
            .expect("cancelled search did not return")
            .unwrap();
        assert_eq!(result.unwrap_err(), SearchError::Cancelled);
    }
}
