use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::ExponentialBackoff;

use crate::network::client::{ClientError, RpcClient};
use crate::node::Node;

#[derive(thiserror::Error, Debug)]
pub enum WaitError<E> {
    #[error("Timed out after {elapsed:?} waiting for {condition}")]
    Timeout { condition: String, elapsed: Duration },
    #[error("Check for {condition} failed: {error}")]
    Failed { condition: String, error: E },
}

/// Polling schedule: exponentially growing delays capped at `max_delay`,
/// abandoned once their sum would exceed `timeout`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub timeout: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(3),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Shortest delay between two checks, whatever the configured schedule.
const MIN_DELAY: Duration = Duration::from_millis(1);

impl Backoff {
    pub fn delays(&self) -> impl Iterator<Item = Duration> + use<> {
        let timeout = self.timeout;
        let initial_delay = self.initial_delay.max(MIN_DELAY);
        let factor = (initial_delay.as_millis() / 2).max(1) as u64;
        ExponentialBackoff::from_millis(2)
            .factor(factor)
            .max_delay(self.max_delay.max(MIN_DELAY))
            .scan(Duration::ZERO, move |elapsed, delay| {
                *elapsed += delay;
                (*elapsed <= timeout).then_some(delay)
            })
    }
}

/// Re-runs `check` until it yields a value. Check errors are retried as
/// well; the last one is reported if the schedule runs out.
///
/// `backoff.timeout` bounds the whole wait, time spent inside checks included.
pub async fn wait_until<T, E, F, Fut>(
    backoff: &Backoff,
    condition: &str,
    mut check: F,
) -> Result<T, WaitError<E>>
where
    E: fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let started = tokio::time::Instant::now();
    let last_error = Mutex::new(None);
    let attempts = Retry::spawn(backoff.delays(), || {
        let attempt = check();
        let last_error = &last_error;
        async move {
            let outcome = attempt.await;
            let mut slot = last_error.lock().unwrap_or_else(PoisonError::into_inner);
            match outcome {
                Ok(Some(value)) => Ok(value),
                Ok(None) => {
                    *slot = None;
                    Err(())
                }
                Err(e) => {
                    tracing::debug!(condition, error = %e, "Check failed, retrying");
                    *slot = Some(e);
                    Err(())
                }
            }
        }
    });
    let result = tokio::time::timeout(backoff.timeout, attempts).await;

    if let Ok(Ok(value)) = result {
        tracing::debug!(condition, elapsed = ?started.elapsed(), "Condition met");
        return Ok(value);
    }
    let last_error = last_error
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner);
    match last_error {
        Some(error) => Err(WaitError::Failed {
            condition: condition.to_string(),
            error,
        }),
        None => Err(WaitError::Timeout {
            condition: condition.to_string(),
            elapsed: started.elapsed(),
        }),
    }
}

/// Waits until the node's head block advanced by `count` blocks.
pub async fn wait_for_blocks<C: RpcClient>(
    node: &Node<C>,
    count: u32,
    backoff: &Backoff,
) -> Result<u32, WaitError<ClientError>> {
    let start = node
        .get_dynamic_global_properties()
        .await
        .map_err(|error| WaitError::Failed {
            condition: "head block".to_string(),
            error,
        })?
        .head_block_number;
    let target = start + count;
    tracing::info!(node = node.name(), start, target, "Waiting for blocks");

    let condition = format!("block {target} on {}", node.name());
    wait_until(backoff, &condition, || async move {
        let head = node.get_dynamic_global_properties().await?.head_block_number;
        Ok::<_, ClientError>((head >= target).then_some(head))
    })
    .await
}
