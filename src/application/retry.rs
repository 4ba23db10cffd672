//! 生成サービス呼び出しの再試行
use crate::error::Result;
use std::future::Future;
use std::time::Duration;

/// 固定回数・指数バックオフの再試行方針
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 初回を含む最大試行回数 (0 は 1 とみなす)
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// 待ち時間なしの方針
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_backoff: Duration::ZERO,
            multiplier: 1,
        }
    }

    /// `failures` 回目の失敗後に待つ時間
    pub fn backoff_for(&self, failures: u32) -> Duration {
        let factor = self
            .multiplier
            .max(1)
            .saturating_pow(failures.saturating_sub(1));
        self.initial_backoff.saturating_mul(factor)
    }

    /// 再試行可能なエラーの間だけ `op` を繰り返す
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut failures = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && failures + 1 < attempts => {
                    failures += 1;
                    let wait = self.backoff_for(failures);
                    log::warn!(
                        "{}: attempt {}/{} failed ({}), retrying in {:?}",
                        label,
                        failures,
                        attempts,
                        e,
                        wait
                    );
                    if !wait.is_zero() {
                        tokio::time::sleep(wait).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnkiVocabError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_for(1), Duration::from_secs(1));
        assert_eq!(policy.backoff_for(2), Duration::from_secs(2));
        assert_eq!(policy.backoff_for(3), Duration::from_secs(4));
    }

    /// サービスエラーは上限回数まで再試行される
    #[tokio::test]
    async fn service_errors_are_retried_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let result = RetryPolicy::immediate(3)
            .run("test", || {
                let calls = calls.clone();
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(AnkiVocabError::ServiceError("overloaded".into()))
                    } else {
                        Ok("ok")
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let result: Result<()> = RetryPolicy::immediate(2)
            .run("test", || {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(AnkiVocabError::ServiceError("down".into()))
                }
            })
            .await;
        assert!(matches!(result, Err(AnkiVocabError::ServiceError(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    /// パースエラーは再試行しない
    #[tokio::test]
    async fn parse_errors_are_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let result: Result<()> = RetryPolicy::immediate(5)
            .run("test", || {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(AnkiVocabError::ParseError("garbage".into()))
                }
            })
            .await;
        assert!(matches!(result, Err(AnkiVocabError::ParseError(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
