//! HTTP surface for the batch server.
//!
//! - `/` (any method) – Plain-text greeting.
//! - `POST /ex2` – Does the number formed by each item's digits make a perfect square?
//! - `POST /ex5` – Decode each item as a binary numeral (`-1` when invalid).
//! - `POST /ex7` – Expand run-length encoded items such as `3a2b`.
//! - `POST /ex9` – Are each item's vowels all at even positions, in even number?
//! - `POST /ex14` – Does each item mix lowercase, uppercase, digits, and symbols?
//!
//! Every batch endpoint takes a JSON array of strings and answers with the same envelope
//! (`original`, `processed`, `count`, `RESULT`, `messages`). Non-POST requests to them are
//! rejected with 405 by the method router before the body is touched.

use crate::config::Config;
use crate::dispatch::DispatchError;
use crate::envelope::{ClientMetadata, process_batch};
use crate::exercises::{
    BinaryDecode, EvenVowels, Exercise, ItemLimits, PasswordStrength, PerfectSquare,
    RunLengthExpand,
};
use axum::{
    Router,
    body::{Body, Bytes, to_bytes},
    extract::State,
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{any, post},
};
use std::time::Duration;
use thiserror::Error;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Body returned by the root handler.
pub const GREETING: &str = "Hello, this is a simple handler!";

/// Limits applied while reading a request body and processing its items.
#[derive(Debug, Clone, Copy)]
struct RequestLimits {
    read_timeout: Duration,
    max_bytes: usize,
    item: ItemLimits,
}

/// Build the HTTP router exposing the greeting and every batch endpoint.
///
/// `config.write_timeout` bounds the time to produce a response (408 when exceeded);
/// `config.read_timeout` and `config.max_body_bytes` bound the body read (400 when exceeded).
/// `config.max_item_output_bytes` bounds what a single item may expand into.
pub fn create_router(config: &Config) -> Router {
    let limits = RequestLimits {
        read_timeout: config.read_timeout,
        max_bytes: config.max_body_bytes,
        item: config.item_limits(),
    };

    Router::new()
        .route("/", any(hello))
        .route(PerfectSquare::PATH, post(handle_batch::<PerfectSquare>))
        .route(BinaryDecode::PATH, post(handle_batch::<BinaryDecode>))
        .route(RunLengthExpand::PATH, post(handle_batch::<RunLengthExpand>))
        .route(EvenVowels::PATH, post(handle_batch::<EvenVowels>))
        .route(PasswordStrength::PATH, post(handle_batch::<PasswordStrength>))
        .with_state(limits)
        .layer(TimeoutLayer::new(config.write_timeout))
        .layer(TraceLayer::new_for_http())
}

async fn hello() -> &'static str {
    GREETING
}

/// Decode a batch, run exercise `E` over it in parallel, and return the JSON envelope.
async fn handle_batch<E: Exercise>(
    State(limits): State<RequestLimits>,
    method: Method,
    headers: HeaderMap,
    body: Body,
) -> Result<Response, ApiError> {
    let bytes = read_body(body, limits).await?;
    let items: Vec<String> = serde_json::from_slice(&bytes).map_err(ApiError::InvalidJson)?;
    let client = ClientMetadata::from_headers(&headers, &method);

    let envelope = process_batch::<E>(items, &client, limits.item).await?;
    let payload = serde_json::to_vec(&envelope).map_err(ApiError::Encode)?;

    Ok((
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )],
        payload,
    )
        .into_response())
}

async fn read_body(body: Body, limits: RequestLimits) -> Result<Bytes, ApiError> {
    match tokio::time::timeout(limits.read_timeout, to_bytes(body, limits.max_bytes)).await {
        Ok(Ok(bytes)) => Ok(bytes),
        Ok(Err(err)) => Err(ApiError::BodyRead(err.to_string())),
        Err(_) => Err(ApiError::BodyRead(format!(
            "timed out after {:?}",
            limits.read_timeout
        ))),
    }
}

/// Failures that abort a batch request before an envelope is produced.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body could not be read in full.
    #[error("failed to read body: {0}")]
    BodyRead(String),
    /// The body was not a JSON array of strings.
    #[error("invalid json: expected array of strings: {0}")]
    InvalidJson(#[source] serde_json::Error),
    /// A worker did not complete.
    #[error("failed to process batch: {0}")]
    Dispatch(#[from] DispatchError),
    /// The envelope could not be serialized.
    #[error("failed to encode response: {0}")]
    Encode(#[source] serde_json::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BodyRead(_) | Self::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Self::Dispatch(_) | Self::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing reason; internal details stay in the logs.
    fn public_message(&self) -> &'static str {
        match self {
            Self::BodyRead(_) => "failed to read body",
            Self::InvalidJson(_) => "invalid json: expected array of strings",
            Self::Dispatch(_) => "failed to process batch",
            Self::Encode(_) => "failed to encode response",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Batch request failed");
        } else {
            tracing::warn!(error = %self, "Rejected batch request");
        }
        (status, self.public_message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use serde_json::{Value, json};
    use std::io;
    use tower::ServiceExt;

    /// Body whose stream never yields, standing in for a client that stalls mid-upload.
    fn stalled_body() -> Body {
        Body::from_stream(futures_util::stream::pending::<Result<Bytes, io::Error>>())
    }

    async fn post_stalled(config: &Config) -> (StatusCode, String) {
        let response = create_router(config)
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/ex2")
                    .body(stalled_body())
                    .expect("request"),
            )
            .await
            .expect("router response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    fn router() -> Router {
        create_router(&Config::default())
    }

    async fn post_json(path: &str, body: String) -> (StatusCode, Value) {
        let response = router()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri(path)
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .expect("request"),
            )
            .await
            .expect("router response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn batch_response_is_json_envelope() {
        let response = router()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/ex9")
                    .body(Body::from(r#"["aXe"]"#))
                    .expect("request"),
            )
            .await
            .expect("router response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
    }

    #[tokio::test]
    async fn object_body_is_rejected() {
        let (status, _) = post_json("/ex2", json!({"items": ["16"]}).to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn non_string_elements_are_rejected() {
        let (status, _) = post_json("/ex2", "[16, 25]".to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let config = Config {
            max_body_bytes: 8,
            ..Config::default()
        };
        let response = create_router(&config)
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/ex5")
                    .body(Body::from(r#"["101","110","111"]"#))
                    .expect("request"),
            )
            .await
            .expect("router response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let (status, _) = post_json("/ex3", "[]".to_string()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn error_statuses_follow_taxonomy() {
        let invalid = serde_json::from_str::<Vec<String>>("{").expect_err("invalid json");
        assert_eq!(
            ApiError::InvalidJson(invalid).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::BodyRead("closed".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_body_read_times_out_as_bad_request() {
        let config = Config {
            read_timeout: Duration::from_millis(50),
            write_timeout: Duration::from_secs(60),
            ..Config::default()
        };
        let (status, text) = post_stalled(&config).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(text, "failed to read body");
    }

    #[tokio::test(start_paused = true)]
    async fn slow_response_hits_write_timeout() {
        let config = Config {
            read_timeout: Duration::from_secs(60),
            write_timeout: Duration::from_millis(50),
            ..Config::default()
        };
        let (status, _) = post_stalled(&config).await;
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    }

    #[tokio::test]
    async fn item_over_output_budget_yields_empty_result() {
        let config = Config {
            max_item_output_bytes: 8,
            ..Config::default()
        };
        let response = create_router(&config)
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/ex7")
                    .body(Body::from(r#"["8a","9a","70000b"]"#))
                    .expect("request"),
            )
            .await
            .expect("router response");
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let body: Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body["processed"], json!(["aaaaaaaa", "", ""]));
        assert_eq!(body["count"], json!(3));
    }
}
