//! 失效重试 - 业务能力层
//!
//! 把一次页面操作包装成"失效就原地重试"的有界循环：
//! - 只有 `SessionError::Stale` 会被重试
//! - 其他错误立即返回
//! - 重试预算耗尽后返回 `RetryError::Exhausted`

use crate::error::SessionError;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::debug;

/// 重试策略：尝试次数 + 固定退避
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: usize,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: usize, backoff: Duration) -> Self {
        Self {
            // 至少尝试一次
            attempts: attempts.max(1),
            backoff,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(300))
    }
}

/// 重试失败的原因
#[derive(Debug, Error)]
pub enum RetryError {
    /// 每次尝试都遇到失效
    #[error("{label}: 连续 {attempts} 次元素失效")]
    Exhausted {
        label: String,
        attempts: usize,
        #[source]
        last: SessionError,
    },

    /// 不可重试的错误
    #[error("{label}: {source}")]
    Failed {
        label: String,
        #[source]
        source: SessionError,
    },
}

impl RetryError {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted { .. })
    }
}

/// 以 `policy` 执行 `op`，失效时原地重试
///
/// `label` 只用于日志和错误信息。
pub async fn retry_on_stale<T, F, Fut>(
    policy: RetryPolicy,
    label: &str,
    mut op: F,
) -> Result<T, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SessionError>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_stale() => {
                debug!("{} 元素失效 (尝试 {}/{}): {}", label, attempt, policy.attempts, e);
                if attempt >= policy.attempts {
                    return Err(RetryError::Exhausted {
                        label: label.to_string(),
                        attempts: attempt,
                        last: e,
                    });
                }
                sleep(policy.backoff).await;
            }
            Err(source) => {
                return Err(RetryError::Failed {
                    label: label.to_string(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tokio_test::{assert_err, assert_ok};

    fn policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::ZERO)
    }

    /// 前 `stale_count` 次返回失效，之后成功
    fn flaky(calls: &Cell<usize>, stale_count: usize) -> Result<usize, SessionError> {
        let n = calls.get() + 1;
        calls.set(n);
        if n <= stale_count {
            Err(SessionError::Stale(format!("第 {} 次", n)))
        } else {
            Ok(n)
        }
    }

    #[tokio::test]
    async fn test_succeeds_within_budget() {
        let calls = Cell::new(0);
        let counter = &calls;
        let result = retry_on_stale(policy(), "select", || async move { flaky(counter, 2) }).await;

        assert_eq!(assert_ok!(result), 3);
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_after_budget() {
        let calls = Cell::new(0);
        let counter = &calls;
        let result = retry_on_stale(policy(), "select", || async move { flaky(counter, 4) }).await;

        let err = assert_err!(result);
        assert!(err.is_exhausted());
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_non_stale_error_is_not_retried() {
        let calls = Cell::new(0);
        let counter = &calls;
        let result: Result<(), _> = retry_on_stale(policy(), "click", || async move {
            counter.set(counter.get() + 1);
            Err(SessionError::NotFound("button.btn-primary".to_string()))
        })
        .await;

        let err = assert_err!(result);
        assert!(matches!(err, RetryError::Failed { .. }));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_policy_has_at_least_one_attempt() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).attempts, 1);
    }
}
