// * Bounded retry with exponential backoff and jitter.
// * Fatal errors stop the loop immediately; retryable errors are re-attempted
// * until the budget is exhausted.

use crate::network::errors::AccessError;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

// * Tagged wrapper the operation uses to steer the loop.
#[derive(Debug)]
pub enum RetryError<E> {
    Retryable(E),
    Fatal(E),
}

impl<E> RetryError<E> {
    // * Drops the retry tag, leaving the underlying cause.
    pub fn into_inner(self) -> E {
        match self {
            Self::Retryable(cause) | Self::Fatal(cause) => cause,
        }
    }
}

impl From<AccessError> for RetryError<AccessError> {
    fn from(err: AccessError) -> Self {
        if err.is_retryable() {
            RetryError::Retryable(err)
        } else {
            RetryError::Fatal(err)
        }
    }
}

// * Runs `operation` up to `max_attempts` times. On a retryable failure the
// * loop sleeps `backoff + uniform(0, backoff)/2` and doubles the slept value
// * for the next round; the half-jitter keeps parallel workers from retrying
// * in lockstep. A fatal failure returns its unwrapped cause with zero sleeps.
pub async fn retry<T, E, F, Fut>(
    max_attempts: u32,
    initial_backoff: Duration,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RetryError<E>>>,
{
    let mut attempts = max_attempts;
    let mut backoff = initial_backoff;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(RetryError::Fatal(cause)) => return Err(cause),
            Err(RetryError::Retryable(cause)) => {
                attempts = attempts.saturating_sub(1);
                if attempts == 0 {
                    return Err(cause);
                }

                let roll = rand::thread_rng().gen_range(0..backoff.as_nanos().max(1) as u64);
                backoff = jittered(backoff, roll);

                debug!(
                    remaining = attempts,
                    backoff_ms = backoff.as_millis() as u64,
                    "retrying after backoff"
                );

                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
        }
    }
}

// * HTTP status classification feeding the loop: 5xx is the upstream's fault
// * and worth another attempt, 4xx is ours and is not.
pub fn classify_status(status: u16) -> Result<(), RetryError<AccessError>> {
    if status >= 500 {
        Err(RetryError::Retryable(AccessError::Server(status)))
    } else if status >= 400 {
        Err(RetryError::Fatal(AccessError::Client(status)))
    } else {
        Ok(())
    }
}

fn jittered(base: Duration, roll_nanos: u64) -> Duration {
    base + Duration::from_nanos(roll_nanos) / 2
}
