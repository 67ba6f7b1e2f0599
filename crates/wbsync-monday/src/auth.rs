//! API token authentication for Monday.com.

use reqwest::RequestBuilder;

/// Personal or app API token.
///
/// The [`Debug`] impl redacts the token to keep it out of log output.
#[derive(Clone)]
pub struct MondayAuth {
    token: String,
}

impl std::fmt::Debug for MondayAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MondayAuth")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl MondayAuth {
    /// Create an auth handler from a token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Whether a non-blank token was supplied.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.token.trim().is_empty()
    }

    /// Apply authentication to a request builder.
    #[must_use]
    pub fn apply(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.bearer_auth(&self.token)
    }
}
