//! Client configuration loaded from environment variables.

use std::time::Duration;

/// Default GraphQL endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.monday.com/v2";

/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default page size for item queries (API maximum is 500).
const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Default cap on pages fetched per query.
const DEFAULT_MAX_PAGES: u32 = 50;

/// Connection settings for [`crate::client::MondayClient`].
#[derive(Clone)]
pub struct MondayConfig {
    /// GraphQL endpoint URL.
    pub endpoint: String,

    /// API token sent as a bearer credential.
    pub token: String,

    /// Optional `API-Version` header value (e.g. "2024-10").
    pub api_version: Option<String>,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Items requested per page.
    pub page_limit: u32,

    /// Maximum number of pages followed for a single query.
    pub max_pages: u32,
}

impl std::fmt::Debug for MondayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MondayConfig")
            .field("endpoint", &self.endpoint)
            .field("token", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .field("timeout", &self.timeout)
            .field("page_limit", &self.page_limit)
            .field("max_pages", &self.max_pages)
            .finish()
    }
}

impl MondayConfig {
    /// Config with default settings for the given token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token: token.into(),
            api_version: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            page_limit: DEFAULT_PAGE_LIMIT,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Point the client at a different endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the page size.
    #[must_use]
    pub fn with_page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit;
        self
    }

    /// Override the cap on pages followed per query.
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader.
    ///
    /// Lets tests supply variables without mutating process-global
    /// environment state.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let token = reader("MONDAY_API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("MONDAY_API_TOKEN".into()))?;

        let endpoint = reader("MONDAY_API_URL").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            return Err(ConfigError::InvalidValue(
                "MONDAY_API_URL".into(),
                format!("unsupported scheme in '{endpoint}'"),
            ));
        }

        let api_version = reader("MONDAY_API_VERSION")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let timeout_secs = reader("MONDAY_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidValue("MONDAY_TIMEOUT_SECS".into(), e.to_string()))?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "MONDAY_TIMEOUT_SECS".into(),
                "must be greater than zero".into(),
            ));
        }

        let page_limit = reader("MONDAY_PAGE_LIMIT")
            .unwrap_or_else(|_| DEFAULT_PAGE_LIMIT.to_string())
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidValue("MONDAY_PAGE_LIMIT".into(), e.to_string()))?
            .clamp(1, 500);

        Ok(Self {
            endpoint,
            token,
            api_version,
            timeout: Duration::from_secs(timeout_secs),
            page_limit,
            max_pages: DEFAULT_MAX_PAGES,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}
