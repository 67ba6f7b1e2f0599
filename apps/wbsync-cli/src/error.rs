//! Error types for the wbsync CLI
//!
//! Every failure the binary can report maps to one exit code:
//!
//! | Code | Meaning                                   |
//! |------|-------------------------------------------|
//! | 0    | success                                   |
//! | 1    | general error (I/O, unexpected API error) |
//! | 2    | authentication rejected                   |
//! | 3    | network error or unhealthy endpoint       |
//! | 4    | invalid configuration or input            |
//! | 5    | batch finished with failed records        |

use thiserror::Error;
use wbsync_monday::error::MondayClientError;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{failed} of {total} records were not reconciled")]
    PartialFailure { failed: usize, total: usize },
}

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Io(_) | CliError::Api(_) => 1,
            CliError::Auth(_) => 2,
            CliError::Network(_) => 3,
            CliError::Config(_) | CliError::Validation(_) => 4,
            CliError::PartialFailure { .. } => 5,
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();
        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {}", suggestion);
            } else {
                eprintln!("\nSuggestion: {}", suggestion);
            }
        }
    }

    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::Auth(_) => Some("Check that MONDAY_API_TOKEN holds a valid API token."),
            CliError::Network(_) => {
                Some("Run 'wbsync check' to verify connectivity to the API endpoint.")
            }
            CliError::PartialFailure { .. } => {
                Some("Failed records are listed above; re-running the batch is safe.")
            }
            _ => None,
        }
    }
}

impl From<MondayClientError> for CliError {
    fn from(e: MondayClientError) -> Self {
        match e {
            MondayClientError::AuthError(msg) => CliError::Auth(msg),
            MondayClientError::InvalidConfig(msg) => CliError::Config(msg),
            other if other.is_retryable() => CliError::Network(other.to_string()),
            other => CliError::Api(other.to_string()),
        }
    }
}

impl From<wbsync_monday::config::ConfigError> for CliError {
    fn from(e: wbsync_monday::config::ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<wbsync_reconcile::config::ConfigError> for CliError {
    fn from(e: wbsync_reconcile::config::ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<csv::Error> for CliError {
    fn from(e: csv::Error) -> Self {
        match e.into_kind() {
            csv::ErrorKind::Io(io) => CliError::Io(io),
            other => CliError::Validation(format!("CSV error: {:?}", other)),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Validation(format!("JSON error: {}", e))
    }
}
