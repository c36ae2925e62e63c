//! Bearer token for the cloud API.

use std::fmt;

/// Environment variable holding the access token.
pub const TOKEN_ENV: &str = "NATURE_REMO_API_TOKEN";

/// An opaque bearer token.
///
/// The value is only reachable through [`Credential::expose`]; `Debug` prints
/// a redacted placeholder and there is no `Display` impl, so the token cannot
/// end up in logs or API responses by accident.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a token. Blank tokens count as "not configured".
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Read the token from [`TOKEN_ENV`].
    pub fn from_env() -> Option<Self> {
        std::env::var(TOKEN_ENV).ok().and_then(Self::new)
    }

    /// The raw token, for building the `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}
