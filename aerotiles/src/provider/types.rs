//! Provider error types

use std::fmt;

/// Errors that can occur while requesting a tile from the upstream source.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Failed to build the HTTP client
    ClientBuild(String),
    /// The request timed out
    Timeout(String),
    /// Connection could not be established or was reset
    Connection(String),
    /// Server answered with a non-success status
    HttpStatus { status: u16, url: String },
    /// Body missing, empty or unreadable
    InvalidResponse(String),
    /// URL template is malformed
    InvalidTemplate(String),
}

impl ProviderError {
    /// Whether a retry of the same request may succeed.
    ///
    /// Timeouts, connection failures, 5xx and 429 responses are transient.
    /// Not-found, other 4xx statuses and malformed bodies are permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Timeout(_) | ProviderError::Connection(_) => true,
            ProviderError::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            ProviderError::ClientBuild(_)
            | ProviderError::InvalidResponse(_)
            | ProviderError::InvalidTemplate(_) => false,
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::ClientBuild(msg) => write!(f, "Failed to create HTTP client: {}", msg),
            ProviderError::Timeout(msg) => write!(f, "Request timed out: {}", msg),
            ProviderError::Connection(msg) => write!(f, "Connection failed: {}", msg),
            ProviderError::HttpStatus { status, url } => write!(f, "HTTP {} from {}", status, url),
            ProviderError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            ProviderError::InvalidTemplate(msg) => write!(f, "Invalid URL template: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}
