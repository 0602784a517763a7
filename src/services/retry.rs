//! 重试服务 - 业务能力层
//!
//! 只负责"失败后按指数退避重试"，不关心请求内容

use crate::error::ApiError;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// 重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 最大尝试次数（含第一次）
    pub max_attempts: usize,
    /// 第一次失败后的等待时间，之后每次翻倍
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }
}

/// 执行 `op`，传输层失败时按指数退避重试
///
/// 应用层拒绝（`ApiError::Rejected`）立即返回；重试耗尽后返回最后一次的错误
///
/// # 参数
/// - `policy`: 重试策略
/// - `label`: 日志中显示的操作名
/// - `op`: 每次调用产生一次新请求
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut op: F,
) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut delay = policy.base_delay;
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) if attempt >= max_attempts => {
                return Err(e.with_attempts(attempt));
            }
            Err(e) => {
                warn!("{} 请求失败 (尝试 {}/{}): {}", label, attempt, max_attempts, e);
                warn!("等待 {:.1} 秒后重试...", delay.as_secs_f64());
                sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_test::{assert_err, assert_ok};

    fn transient() -> ApiError {
        ApiError::Http {
            endpoint: "test".to_string(),
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn quick_policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let result = retry_with_backoff(&quick_policy(), "test", move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(transient())
            } else {
                Ok(7)
            }
        })
        .await;

        assert_eq!(assert_ok!(result), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let result: Result<(), _> = retry_with_backoff(&quick_policy(), "test", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(transient())
        })
        .await;

        assert_err!(&result);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_rejected_is_not_retried() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let result: Result<(), _> = retry_with_backoff(&quick_policy(), "test", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ApiError::Rejected {
                payload: json!({"success": 2}),
            })
        })
        .await;

        assert!(matches!(result, Err(ApiError::Rejected { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_backoff_doubles_delay() {
        let policy = RetryPolicy::new(3, Duration::from_millis(20));
        let started = tokio::time::Instant::now();
        let result: Result<(), _> =
            retry_with_backoff(&policy, "test", || async { Err(transient()) }).await;

        assert!(result.is_err());
        // 20ms + 40ms
        assert!(started.elapsed() >= Duration::from_millis(60));
    }
}
