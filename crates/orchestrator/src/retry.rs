//! Exponential backoff with jitter for C3-class retryable errors (spec
//! §4.8 "Failure semantics": base 1s, max 10s, factor 2, ±25% jitter).

use std::future::Future;
use std::time::Duration;

use labelforge_core::{LabelError, LabelResult};

#[derive(Debug, Clone, Copy)]
pub struct BackoffConfig {
    pub base_ms: u64,
    pub max_ms: u64,
    pub factor: f64,
    pub jitter_pct: f64,
    pub max_retries: u32,
}

impl BackoffConfig {
    pub const fn default_image_retry() -> Self {
        Self {
            base_ms: 1_000,
            max_ms: 10_000,
            factor: 2.0,
            jitter_pct: 0.25,
            max_retries: 3,
        }
    }
}

fn backoff_delay(attempt: u32, cfg: &BackoffConfig) -> Duration {
    let raw = cfg.base_ms as f64 * cfg.factor.powi(attempt as i32);
    let capped = raw.min(cfg.max_ms as f64);
    let jitter_span = capped * cfg.jitter_pct;
    let jitter = jitter_span * (rand::random::<f64>() * 2.0 - 1.0);
    Duration::from_millis((capped + jitter).max(0.0).round() as u64)
}

/// Retries `f` while it returns a retryable [`LabelError`], up to
/// `cfg.max_retries` additional attempts, sleeping with jittered
/// exponential backoff between attempts.
pub async fn with_retry<F, Fut, T>(cfg: &BackoffConfig, mut f: F) -> LabelResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = LabelResult<T>>,
{
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(err) if err.retryable() && attempt < cfg.max_retries => {
                let delay = backoff_delay(attempt, cfg);
                tracing::warn!(attempt, delay_ms = delay.as_millis() as u64, error = %err, "retrying after transient failure");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Wraps a stage future with a timeout, mapping elapsed time into the
/// spec's `error=timeout` convention.
pub async fn with_timeout<Fut, T>(stage: &str, duration: Duration, fut: Fut) -> LabelResult<T>
where
    Fut: Future<Output = LabelResult<T>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(result) => result,
        Err(_) => Err(LabelError::StageFailed {
            stage: stage.to_string(),
            reason: "timeout".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_retryable_errors_until_success() {
        let attempts = AtomicU32::new(0);
        let cfg = BackoffConfig {
            base_ms: 1,
            max_ms: 2,
            factor: 1.0,
            jitter_pct: 0.0,
            max_retries: 3,
        };

        let result: LabelResult<u32> = with_retry(&cfg, || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(LabelError::Network("transient".to_string()))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
    }

    #[tokio::test]
    async fn does_not_retry_non_retryable_errors() {
        let attempts = AtomicU32::new(0);
        let cfg = BackoffConfig {
            base_ms: 1,
            max_ms: 2,
            factor: 1.0,
            jitter_pct: 0.0,
            max_retries: 3,
        };

        let result: LabelResult<u32> = with_retry(&cfg, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async move { Err(LabelError::Validation("bad".to_string())) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn timeout_produces_stage_failed_with_timeout_reason() {
        let result: LabelResult<()> = with_timeout("render", Duration::from_millis(5), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        match result {
            Err(LabelError::StageFailed { reason, .. }) => assert_eq!(reason, "timeout"),
            other => panic!("expected timeout stage failure, got {other:?}"),
        }
    }
}
