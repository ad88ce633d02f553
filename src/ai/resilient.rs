//! Retry, timeout and circuit-breaker handling around any [`AiBackend`]

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::{info, warn};

use super::{AiBackend, AiError, AudioClip};
use crate::circuit_breaker::CircuitBreaker;
use crate::config::RecoveryConfig;
use crate::workout::WorkoutRecord;

/// Wraps a backend so that transient failures are retried with exponential
/// backoff and a failing provider is short-circuited.
pub struct ResilientBackend<B> {
    inner: B,
    recovery: RecoveryConfig,
    breaker: CircuitBreaker,
}

impl<B: AiBackend> ResilientBackend<B> {
    pub fn new(inner: B, recovery: &RecoveryConfig) -> Self {
        Self {
            inner,
            breaker: CircuitBreaker::new(recovery),
            recovery: recovery.clone(),
        }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Delay before retry number `attempt` (0-based), with up to 10% jitter
    fn retry_delay(&self, attempt: u32) -> Duration {
        let exponential = self
            .recovery
            .base_retry_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt));
        let capped = exponential.min(self.recovery.max_retry_delay_ms);
        let jitter = rand::thread_rng().gen_range(0..=capped / 10);
        Duration::from_millis(capped.saturating_add(jitter).min(self.recovery.max_retry_delay_ms))
    }

    async fn call<T, F, Fut>(&self, operation: &str, mut attempt_once: F) -> Result<T, AiError>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, AiError>> + Send,
        T: Send,
    {
        if self.breaker.is_open() {
            warn!(provider = self.inner.name(), operation, "Circuit breaker open, skipping call");
            return Err(AiError::CircuitOpen);
        }

        let timeout = Duration::from_secs(self.recovery.operation_timeout_secs);
        let mut attempt = 0;
        loop {
            let outcome = match tokio::time::timeout(timeout, attempt_once()).await {
                Ok(result) => result,
                Err(_) => Err(AiError::Timeout(format!(
                    "{operation} did not finish within {}s",
                    timeout.as_secs()
                ))),
            };

            match outcome {
                Ok(value) => {
                    self.breaker.record_success();
                    if attempt > 0 {
                        info!(provider = self.inner.name(), operation, attempt, "AI call succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) if err.is_retryable() && attempt < self.recovery.max_retries => {
                    let delay = self.retry_delay(attempt);
                    attempt += 1;
                    warn!(
                        provider = self.inner.name(),
                        operation,
                        error = %err,
                        "AI call failed, retry {attempt}/{} in {}ms",
                        self.recovery.max_retries,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    if err.is_retryable() {
                        self.breaker.record_failure();
                    }
                    warn!(provider = self.inner.name(), operation, error = %err, "AI call failed");
                    return Err(err);
                }
            }
        }
    }
}

#[async_trait]
impl<B: AiBackend> AiBackend for ResilientBackend<B> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn transcribe(&self, audio: &AudioClip) -> Result<String, AiError> {
        self.call("transcribe", || self.inner.transcribe(audio)).await
    }

    async fn parse_workout(&self, text: &str) -> Result<WorkoutRecord, AiError> {
        self.call("parse_workout", || self.inner.parse_workout(text))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Replays scripted outcomes, one per call
    struct ScriptedBackend {
        calls: AtomicU32,
        script: Mutex<Vec<Result<String, AiError>>>,
        stall: Option<Duration>,
    }

    impl ScriptedBackend {
        fn new(mut script: Vec<Result<String, AiError>>) -> Self {
            script.reverse();
            Self {
                calls: AtomicU32::new(0),
                script: Mutex::new(script),
                stall: None,
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AiBackend for ScriptedBackend {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn transcribe(&self, _audio: &AudioClip) -> Result<String, AiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(stall) = self.stall {
                tokio::time::sleep(stall).await;
            }
            let next = self.script.lock().unwrap().pop();
            next.unwrap_or_else(|| Ok("default".to_string()))
        }

        async fn parse_workout(&self, _text: &str) -> Result<WorkoutRecord, AiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(AiError::InvalidResponse("not json".to_string()))
        }
    }

    fn fast_recovery() -> RecoveryConfig {
        RecoveryConfig {
            max_retries: 2,
            base_retry_delay_ms: 1,
            max_retry_delay_ms: 5,
            operation_timeout_secs: 5,
            circuit_breaker_threshold: 2,
            circuit_breaker_reset_secs: 60,
        }
    }

    fn clip() -> AudioClip {
        AudioClip::wav(vec![0u8; 8])
    }

    #[tokio::test]
    async fn test_retries_transient_failures() {
        let backend = ResilientBackend::new(
            ScriptedBackend::new(vec![
                Err(AiError::Request("connection reset".to_string())),
                Err(AiError::Api { status: 503, message: "overloaded".to_string() }),
                Ok("hello".to_string()),
            ]),
            &fast_recovery(),
        );

        assert_eq!(backend.transcribe(&clip()).await.unwrap(), "hello");
        assert_eq!(backend.inner().calls(), 3);
        assert_eq!(backend.circuit_breaker().failure_count(), 0);
    }

    #[tokio::test]
    async fn test_non_retryable_error_is_returned_immediately() {
        let backend = ResilientBackend::new(ScriptedBackend::new(vec![]), &fast_recovery());

        let err = backend.parse_workout("bench").await.unwrap_err();
        assert!(matches!(err, AiError::InvalidResponse(_)));
        assert_eq!(backend.inner().calls(), 1);
        assert_eq!(backend.circuit_breaker().failure_count(), 0);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let failures = (0..3)
            .map(|_| Err(AiError::Timeout("slow".to_string())))
            .collect();
        let backend = ResilientBackend::new(ScriptedBackend::new(failures), &fast_recovery());

        let err = backend.transcribe(&clip()).await.unwrap_err();
        assert!(matches!(err, AiError::Timeout(_)));
        // One attempt plus two retries
        assert_eq!(backend.inner().calls(), 3);
        assert_eq!(backend.circuit_breaker().failure_count(), 1);
    }

    #[tokio::test]
    async fn test_open_breaker_skips_backend() {
        let recovery = RecoveryConfig {
            max_retries: 0,
            ..fast_recovery()
        };
        let failures = (0..2)
            .map(|_| Err(AiError::Api { status: 500, message: String::new() }))
            .collect();
        let backend = ResilientBackend::new(ScriptedBackend::new(failures), &recovery);

        assert!(backend.transcribe(&clip()).await.is_err());
        assert!(backend.transcribe(&clip()).await.is_err());
        assert_eq!(backend.inner().calls(), 2);

        assert_eq!(backend.transcribe(&clip()).await.unwrap_err(), AiError::CircuitOpen);
        assert_eq!(backend.inner().calls(), 2);
    }

    #[tokio::test]
    async fn test_slow_call_times_out() {
        let recovery = RecoveryConfig {
            max_retries: 0,
            operation_timeout_secs: 1,
            ..fast_recovery()
        };
        let mut slow = ScriptedBackend::new(vec![Ok("late".to_string())]);
        slow.stall = Some(Duration::from_secs(3));
        let backend = ResilientBackend::new(slow, &recovery);

        let err = backend.transcribe(&clip()).await.unwrap_err();
        assert!(matches!(err, AiError::Timeout(_)));
    }

    #[test]
    fn test_retry_delay_is_capped() {
        let backend = ResilientBackend::new(
            ScriptedBackend::new(vec![]),
            &RecoveryConfig {
                base_retry_delay_ms: 1000,
                max_retry_delay_ms: 10_000,
                ..Default::default()
            },
        );
        let first = backend.retry_delay(0).as_millis();
        assert!((1000..=1100).contains(&first));
        assert_eq!(backend.retry_delay(10).as_millis(), 10_000);
        assert_eq!(backend.retry_delay(u32::MAX).as_millis(), 10_000);
    }
}
