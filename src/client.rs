//! Batch client: load items from a line-oriented file and post them to the server.

use crate::envelope::{CLIENT_NAME_HEADER, REQUEST_TYPE_HEADER};
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, InvalidHeaderValue};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Input file read when no path is given.
pub const DEFAULT_INPUT: &str = "data/ex14-input.txt";
/// Server base URL used when none is given.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

/// Local failures that stop the client before a response is received.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The input file could not be read.
    #[error("failed to read {path}: {source}")]
    ReadInput {
        /// File we attempted to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The batch could not be encoded as JSON.
    #[error("failed to marshal json: {0}")]
    Encode(#[from] serde_json::Error),
    /// A header value contained characters HTTP does not allow.
    #[error("failed to build request: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),
    /// The request could not be sent or the response could not be read.
    #[error("request error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Split `content` into trimmed, non-empty lines, keeping at most `max` of them.
///
/// Zero or a negative `max` keeps every line.
pub fn parse_batch(content: &str, max: i64) -> Vec<String> {
    let lines = content
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string);
    match usize::try_from(max) {
        Ok(limit) if limit > 0 => lines.take(limit).collect(),
        _ => lines.collect(),
    }
}

/// Read and parse the batch stored at `path`.
pub fn read_batch(path: &Path, max: i64) -> Result<Vec<String>, ClientError> {
    let content = std::fs::read_to_string(path).map_err(|source| ClientError::ReadInput {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_batch(&content, max))
}

/// Status line and raw body returned by the server.
#[derive(Debug, Clone)]
pub struct BatchReply {
    /// HTTP status of the response.
    pub status: StatusCode,
    /// Response body, unparsed.
    pub body: String,
}

impl BatchReply {
    /// Messages the server included in its envelope, if the body carries any.
    pub fn server_messages(&self) -> Vec<String> {
        server_messages(&self.body)
    }
}

/// Extract the string entries of a top-level `messages` array from a JSON object body.
///
/// Returns an empty list for bodies that are not JSON objects or have no such array.
pub fn server_messages(body: &str) -> Vec<String> {
    let Ok(Value::Object(object)) = serde_json::from_str::<Value>(body) else {
        return Vec::new();
    };
    match object.get("messages") {
        Some(Value::Array(messages)) => messages
            .iter()
            .filter_map(|message| message.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// HTTP client posting batches on behalf of a named caller.
pub struct BatchClient {
    http: reqwest::Client,
    base_url: String,
    client_name: String,
}

impl BatchClient {
    /// Create a client for `base_url` that identifies itself as `client_name`.
    pub fn new(base_url: impl Into<String>, client_name: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client_name: client_name.into(),
        }
    }

    /// Name sent in `X-Client-Name`.
    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    /// Headers attached to every batch request.
    pub fn headers(&self) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(CLIENT_NAME_HEADER, HeaderValue::from_str(&self.client_name)?);
        headers.insert(REQUEST_TYPE_HEADER, HeaderValue::from_static("POST"));
        Ok(headers)
    }

    /// POST an already encoded JSON batch to `path` and return the raw reply.
    ///
    /// Non-success statuses are returned as replies, not errors.
    pub async fn post_json(&self, path: &str, payload: Vec<u8>) -> Result<BatchReply, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, bytes = payload.len(), "Posting batch");
        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .body(payload)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(status = %status, "Batch reply received");
        Ok(BatchReply { status, body })
    }
}
