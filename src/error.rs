//! Unified infrastructure error type.

use thiserror::Error;

/// The error type returned by the fixture's fallible setup operations.
///
/// Request-level failures (400, 401, 403, ...) are expressed as
/// [`StructuredError`](crate::StructuredError) responses, not as `Error`s.
/// This type surfaces infrastructure failures: binding to a port, installing
/// the log subscriber, or a nonsensical configuration.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid latency window: {min_ms}..{max_ms} ms (min must be below max)")]
    InvalidLatency { min_ms: u64, max_ms: u64 },

    #[error("logger: {0}")]
    Logger(String),
}
