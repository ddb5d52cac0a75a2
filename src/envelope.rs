//! Request-scoped batch handling: client metadata, dispatch, and the response envelope.

use axum::http::{HeaderMap, Method};
use serde::Serialize;

use crate::dispatch::{DispatchError, parallel_map};
use crate::exercises::{Exercise, ItemLimits};

/// Header carrying the caller's display name.
pub const CLIENT_NAME_HEADER: &str = "x-client-name";
/// Header carrying the caller's own label for the request kind.
pub const REQUEST_TYPE_HEADER: &str = "x-request-type";
/// Client name used when the header is missing or empty.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Caller identity taken from optional request headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientMetadata {
    /// Value of `X-Client-Name`, or `unknown`.
    pub client_name: String,
    /// Value of `X-Request-Type`, or the HTTP method.
    pub request_type: String,
}

impl ClientMetadata {
    /// Read the metadata headers, substituting defaults for missing, empty, or non-text values.
    pub fn from_headers(headers: &HeaderMap, method: &Method) -> Self {
        Self {
            client_name: header_text(headers, CLIENT_NAME_HEADER)
                .unwrap_or_else(|| UNKNOWN_CLIENT.to_string()),
            request_type: header_text(headers, REQUEST_TYPE_HEADER)
                .unwrap_or_else(|| method.as_str().to_string()),
        }
    }

    /// Log line recorded when a batch arrives.
    pub fn received_message(&self, items: usize) -> String {
        format!(
            "Server received request from client {} (type={}) with {} items",
            self.client_name, self.request_type, items
        )
    }

    /// Log line recorded once the response is ready.
    pub fn sent_message(&self) -> String {
        format!("Server sends response to client {}", self.client_name)
    }
}

fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Uniform response body returned by every batch endpoint.
#[derive(Debug, Serialize)]
pub struct Envelope<T, A> {
    /// Items exactly as received.
    pub original: Vec<String>,
    /// Per-item results, index-aligned with `original`.
    pub processed: Vec<T>,
    /// Number of items in the batch.
    pub count: usize,
    /// Endpoint-specific aggregate over `processed`.
    #[serde(rename = "RESULT")]
    pub result: A,
    /// Received and sent messages, in that order.
    pub messages: Vec<String>,
}

/// Run exercise `E` over a batch and assemble its envelope.
pub async fn process_batch<E: Exercise>(
    original: Vec<String>,
    client: &ClientMetadata,
    limits: ItemLimits,
) -> Result<Envelope<E::Output, E::Aggregate>, DispatchError> {
    let count = original.len();
    let mut messages = Vec::with_capacity(2);
    messages.push(client.received_message(count));
    tracing::info!(
        path = E::PATH,
        client = %client.client_name,
        request_type = %client.request_type,
        items = count,
        "Batch received"
    );

    let processed =
        parallel_map(&original, move |_, item| E::process_limited(item, limits)).await?;
    let result = E::aggregate(&original, &processed);

    messages.push(client.sent_message());
    tracing::debug!(path = E::PATH, client = %client.client_name, "Batch processed");

    Ok(Envelope {
        original,
        processed,
        count,
        result,
        messages,
    })
}
