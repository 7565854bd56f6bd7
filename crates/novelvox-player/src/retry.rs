//! Fixed-backoff retry for foreground loads.
//!
//! Only transient failures ([`PlayerError::is_transient`]) are retried.
//! Prefetch loads never go through here.

use std::future::Future;
use std::time::Duration;

use crate::error::PlayerError;

/// How often and how patiently to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub max_retries: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub const NONE: Self = Self {
        max_retries: 0,
        backoff: Duration::ZERO,
    };
}

/// Run `op`, re-running it after `policy.backoff` while it fails transiently
/// and retries remain.
pub async fn with_retries<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, PlayerError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PlayerError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < policy.max_retries => {
                attempt += 1;
                tracing::warn!(
                    attempt,
                    max = policy.max_retries,
                    error = %err,
                    "Foreground load failed, retrying"
                );
                tokio::time::sleep(policy.backoff).await;
            }
            Err(err) => return Err(err),
        }
    }
}
