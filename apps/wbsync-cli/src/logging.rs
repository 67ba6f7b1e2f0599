//! Tracing subscriber setup for the CLI
//!
//! `RUST_LOG` takes precedence; otherwise the filter is derived from the
//! `-v` / `-d` flags. Logs go to stderr so report output on stdout stays
//! machine-readable.

use tracing_subscriber::EnvFilter;

/// Verbosity level for CLI output
///
/// Levels are ordered: Normal < Verbose < Debug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// Warnings and errors only
    #[default]
    Normal,
    /// Per-record decisions and batch summary
    Verbose,
    /// GraphQL requests and pipeline stage transitions
    Debug,
}

impl LogLevel {
    /// Create LogLevel from CLI flags. Debug wins over verbose.
    pub fn from_flags(verbose: bool, debug: bool) -> Self {
        if debug {
            Self::Debug
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }

    /// Filter directive used when `RUST_LOG` is unset.
    pub fn directive(&self) -> &'static str {
        match self {
            Self::Normal => "warn",
            Self::Verbose => "warn,wbsync_reconcile=info,wbsync_monday=info,wbsync_cli=info",
            Self::Debug => "info,wbsync_reconcile=debug,wbsync_monday=debug,wbsync_cli=debug",
        }
    }
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init_logging(level: LogLevel, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.directive()))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
