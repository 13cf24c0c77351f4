//! Bounded retry for flaky browser interactions.

use std::fmt;

/// Upper bound on attempts for one interaction. No backoff between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(6)
    }
}

/// Every attempt failed. Carries the error of the final attempt.
#[derive(Debug)]
pub struct RetriesExhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

impl<E: fmt::Display> fmt::Display for RetriesExhausted<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "gave up after {} attempts: {}",
            self.attempts, self.last_error
        )
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for RetriesExhausted<E> {}

/// Runs `op` until it succeeds or `policy.max_attempts` attempts have failed.
///
/// `op` receives the 1-based attempt number. Runs synchronously; callers on
/// the async runtime wrap it in `spawn_blocking`.
pub fn retry<T, E, F>(policy: RetryPolicy, label: &str, mut op: F) -> Result<T, RetriesExhausted<E>>
where
    F: FnMut(u32) -> Result<T, E>,
    E: fmt::Display,
{
    let mut attempt = 1;
    loop {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= policy.max_attempts => {
                return Err(RetriesExhausted {
                    attempts: attempt,
                    last_error: err,
                })
            }
            Err(err) => {
                tracing::warn!(
                    "{} failed (attempt {}/{}): {}",
                    label,
                    attempt,
                    policy.max_attempts,
                    err
                );
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn succeeds_first_attempt() {
        let mut calls = 0;
        let result: Result<u32, RetriesExhausted<String>> = retry(RetryPolicy::new(3), "open", |n| {
            calls += 1;
            Ok(n)
        });
        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls, 1);
    }

    #[test]
    fn succeeds_after_failures() {
        let result = retry(RetryPolicy::new(6), "open", |n| {
            if n < 4 {
                Err(format!("timeout {}", n))
            } else {
                Ok("modal")
            }
        });
        assert_eq!(result.unwrap(), "modal");
    }

    #[test]
    fn exhaustion_keeps_last_error() {
        let mut calls = 0;
        let result: Result<(), _> = retry(RetryPolicy::new(6), "close", |n| {
            calls += 1;
            Err(format!("still visible ({})", n))
        });
        let err = result.unwrap_err();
        assert_eq!(calls, 6);
        assert_eq!(err.attempts, 6);
        assert_eq!(err.last_error, "still visible (6)");
        assert_eq!(err.to_string(), "gave up after 6 attempts: still visible (6)");
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let mut calls = 0;
        let _: Result<(), _> = retry(RetryPolicy::new(0), "open", |_| {
            calls += 1;
            Err("no")
        });
        assert_eq!(calls, 1);
    }
}
