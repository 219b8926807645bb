//! Posting Interaction responses back to Slack's `response_url`.
//!
//! A string response is sent as `{"text": ...}`; an object is sent as is.
//! Anything else is returned to the caller without being posted.

use std::time::Duration;

use reqwest::ClientBuilder;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::error::{RuntimeError, RuntimeResult};

/// Default timeout for a single post.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for `response_url` posts.
#[derive(Debug, Clone)]
pub struct ResponseUrlClient {
    client: reqwest::Client,
}

impl ResponseUrlClient {
    /// Creates a client whose posts time out after `timeout`.
    pub fn new(timeout: Duration) -> RuntimeResult<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .build()
            .map_err(|e| RuntimeError::Http(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wraps an already configured client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Posts `response` to `url` if it has a postable shape.
    ///
    /// Returns `Ok(false)` when nothing was sent.
    pub async fn respond(&self, url: &str, response: &Value) -> RuntimeResult<bool> {
        let Some(body) = response_body(response) else {
            debug!(url, "Response is neither text nor an object, not posting");
            return Ok(false);
        };

        let resp = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RuntimeError::Http(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(RuntimeError::Http(format!(
                "HTTP {} error: {}",
                status.as_u16(),
                text
            )));
        }

        info!(url, status = status.as_u16(), "Posted response to response_url");
        Ok(true)
    }
}

/// The JSON body posted for a handler response, if any.
pub fn response_body(response: &Value) -> Option<Value> {
    match response {
        Value::String(text) => Some(json!({ "text": text })),
        Value::Object(_) => Some(response.clone()),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::Json;
    use axum::http::StatusCode;
    use axum::routing::post;
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    /// Serves `POST /hook` locally, forwarding every body it receives.
    pub(crate) async fn hook_server(status: StatusCode) -> (String, mpsc::UnboundedReceiver<Value>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let app = axum::Router::new().route(
            "/hook",
            post(move |Json(body): Json<Value>| {
                let tx = tx.clone();
                async move {
                    let _ = tx.send(body);
                    status
                }
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        (format!("http://{addr}/hook"), rx)
    }

    pub(crate) fn local_client() -> ResponseUrlClient {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        ResponseUrlClient::with_client(client)
    }

    #[test]
    fn test_response_body() {
        assert_eq!(response_body(&json!("done")), Some(json!({"text": "done"})));
        assert_eq!(
            response_body(&json!({"text": "done", "replace_original": true})),
            Some(json!({"text": "done", "replace_original": true}))
        );
        assert_eq!(response_body(&json!(3)), None);
        assert_eq!(response_body(&json!(["a"])), None);
        assert_eq!(response_body(&Value::Null), None);
    }

    #[tokio::test]
    async fn test_respond_posts_text() {
        let (url, mut bodies) = hook_server(StatusCode::OK).await;
        let posted = local_client().respond(&url, &json!("approved")).await.unwrap();
        assert!(posted);
        assert_eq!(bodies.recv().await.unwrap(), json!({"text": "approved"}));
    }

    #[tokio::test]
    async fn test_respond_skips_other_shapes() {
        let (url, mut bodies) = hook_server(StatusCode::OK).await;
        assert!(!local_client().respond(&url, &json!(42)).await.unwrap());
        assert!(bodies.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_respond_reports_http_errors() {
        let (url, _bodies) = hook_server(StatusCode::NOT_FOUND).await;
        let err = local_client().respond(&url, &json!("late")).await.unwrap_err();
        assert!(matches!(err, RuntimeError::Http(ref msg) if msg.starts_with("HTTP 404")));
    }
}
