//! Error types for remo-core.
//!
//! Every failure the acquisition layer can see while talking to the cloud API
//! (or to the server-side proxy) is represented here.
//!
//! # Failure Kinds
//!
//! | Error | Cause | Poller behavior |
//! |-------|-------|-----------------|
//! | [`Error::Http`] | Non-2xx response (bad token, rate limit, outage) | Synthetic fallback + advisory message |
//! | [`Error::Network`] | DNS, connect, timeout, connection reset | Synthetic fallback + advisory message |
//! | [`Error::Decode`] | Body is not the expected JSON | Synthetic fallback + advisory message |
//! | [`Error::InvalidUrl`] | Misconfigured base URL | Reported at construction time |
//! | [`Error::Client`] | HTTP client could not be built | Reported at construction time |
//!
//! No variant is retried by the client itself. The polling controller simply
//! tries again on its next tick.

use thiserror::Error;

/// Errors that can occur when fetching sensor data.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The server answered with a non-success status.
    #[error("API error: {status} {status_text}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status.
        status_text: String,
    },

    /// The request never produced a response.
    #[error("Network error requesting {url}: {source}")]
    Network {
        /// Requested URL.
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body could not be decoded.
    #[error("Malformed response from {url}: {source}")]
    Decode {
        /// Requested URL.
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Invalid base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to construct the HTTP client.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl Error {
    /// Build an [`Error::Http`] from a status code.
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        Error::Http {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }

    /// HTTP status code, if the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this failure happened while talking to the remote side
    /// (as opposed to a local configuration problem).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Http { .. } | Error::Network { .. } | Error::Decode { .. }
        )
    }
}

/// Result type alias using remo-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;
