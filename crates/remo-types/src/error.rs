//! Error types for data parsing in remo-types.

use thiserror::Error;

/// Errors that can occur when parsing dashboard values.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The history range is not one of the supported presets.
    #[error("Invalid history range '{0}': expected 6h, 24h or 72h")]
    InvalidRange(String),
}

/// Result type alias using remo-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
