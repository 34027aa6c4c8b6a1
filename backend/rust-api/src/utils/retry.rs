use std::time::Duration;

/// Bounded exponential backoff used by the mongo/redis storage backends.
/// Jitter keeps concurrent retries from synchronizing.
#[derive(Clone)]
pub struct RetryConfig {
    pub max_attempts: usize,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
    pub jitter_max: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_backoff: Duration::from_millis(20),
            max_backoff: Duration::from_millis(500),
            jitter_max: Some(Duration::from_millis(50)),
        }
    }
}

impl RetryConfig {
    /// Delay before retrying after the given 1-based attempt has failed.
    fn backoff_for(&self, attempt: usize) -> Duration {
        let exp = attempt.saturating_sub(1).min(16) as u32;
        self.base_backoff
            .saturating_mul(1u32 << exp)
            .min(self.max_backoff)
    }

    fn jitter(&self) -> Duration {
        match self.jitter_max {
            Some(cap) if !cap.is_zero() => {
                Duration::from_millis(rand::random_range(0..=cap.as_millis() as u64))
            }
            _ => Duration::ZERO,
        }
    }
}

/// Runs `operation` up to `config.max_attempts` times, sleeping between
/// failures. The last error is returned unchanged once attempts run out.
pub async fn retry_async<F, Fut, T, E>(config: RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= config.max_attempts {
                    return Err(err);
                }
                tokio::time::sleep(config.backoff_for(attempt) + config.jitter()).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config(max_attempts: usize) -> RetryConfig {
        RetryConfig {
            max_attempts,
            base_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(10),
            jitter_max: None,
        }
    }

    #[test]
    fn backoff_doubles_up_to_the_cap() {
        let cfg = quick_config(5);
        assert_eq!(cfg.backoff_for(1), Duration::from_millis(1));
        assert_eq!(cfg.backoff_for(3), Duration::from_millis(4));
        assert_eq!(cfg.backoff_for(10), Duration::from_millis(10));
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let mut calls = 0;
        let res: Result<u32, &'static str> = retry_async(quick_config(3), || {
            calls += 1;
            let n = calls;
            async move {
                if n < 3 {
                    Err("transient")
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(res, Ok(3));
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let mut calls = 0;
        let res: Result<(), &'static str> = retry_async(quick_config(2), || {
            calls += 1;
            async { Err("always down") }
        })
        .await;

        assert_eq!(res, Err("always down"));
        assert_eq!(calls, 2);
    }
}
