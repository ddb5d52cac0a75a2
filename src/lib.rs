#![deny(missing_docs)]

//! Core library for the parbatch batch-processing server and its companion tools.

/// HTTP routing and handlers.
pub mod api;
/// Client helpers used by the `ex14-client` binary.
pub mod client;
/// Environment-driven configuration management.
pub mod config;
/// Bounded, deduplicating crawler over a pluggable fetcher.
pub mod crawler;
/// Fan-out/fan-in execution of per-item processors.
pub mod dispatch;
/// Request-scoped batch handling and the response envelope.
pub mod envelope;
/// Per-endpoint processors and their route bindings.
pub mod exercises;
/// Structured logging and tracing setup.
pub mod logging;
