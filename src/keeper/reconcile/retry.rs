use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use crate::config::RetryConfig;
use crate::keeper::ReconcileError;

/// How remote mutations are retried.
///
/// Retries happen immediately, without any backoff. When `attempt_timeout` is set, an attempt
/// that takes longer is abandoned and counts as a failure, which bounds the total latency
/// of an operation to `(retries + 1) * attempt_timeout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Number of attempts made after the first one failed.
    pub retries: u32,
    pub attempt_timeout: Option<Duration>,
}

impl RetryPolicy {
    pub const NO_RETRY: Self = Self {
        retries: 0,
        attempt_timeout: None,
    };
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 1,
            attempt_timeout: None,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            retries: config.retries,
            attempt_timeout: config.attempt_timeout(),
        }
    }
}

/// Runs `attempt` until it succeeds or the policy runs out of retries.
/// The last error is returned together with the name of the operation and its target.
pub async fn with_retry<T, F, Fut>(
    policy: RetryPolicy,
    operation: &'static str,
    target: &(dyn Display + Sync),
    mut attempt: F,
) -> Result<T, ReconcileError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let mut failures = 0;
    loop {
        let result = match policy.attempt_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, attempt()).await {
                Ok(result) => result,
                Err(_) => Err(anyhow::anyhow!("Attempt timed out after {timeout:?}")),
            },
            None => attempt().await,
        };
        match result {
            Ok(value) => return Ok(value),
            Err(error) if failures < policy.retries => {
                failures += 1;
                tracing::warn!(
                    "{operation} failed for {target}, retrying ({failures}/{}): {error:?}",
                    policy.retries
                );
            }
            Err(error) => {
                tracing::error!("{operation} failed for {target}: {error:?}");
                return Err(ReconcileError::new(operation, target, error));
            }
        }
    }
}
