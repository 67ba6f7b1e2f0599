//! Caller-side timeout for board API calls.

use std::future::Future;
use std::time::Duration;

use wbsync_monday::error::{MondayClientError, MondayClientResult};

/// Await `call`, failing with [`MondayClientError::Timeout`] if it does not
/// complete within `timeout`.
pub(crate) async fn with_timeout<T, F>(timeout: Duration, call: F) -> MondayClientResult<T>
where
    F: Future<Output = MondayClientResult<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(MondayClientError::Timeout {
            timeout_secs: timeout.as_secs(),
        }),
    }
}
