//! Raw transport failures, before classification.

/// Errors produced while talking to the backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// No response was obtained (connection refused, DNS failure, reset).
    #[error("connection failed: {0}")]
    Connect(String),
    /// The service answered with a non-2xx status. `body` is kept verbatim.
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
    /// A 2xx response whose body did not match the expected shape.
    #[error("invalid response body: {0}")]
    Decode(String),
    #[error("HTTP client setup failed: {0}")]
    Client(String),
}
