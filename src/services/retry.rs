//! 重试策略
//!
//! 固定次数 + 线性退避：第 n 次失败后等待 `base_delay * n`

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 总尝试次数（含第一次），小于 1 时按 1 处理
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// 第 `attempt` 次（从0开始）失败后的等待时间
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt.saturating_add(1))
    }

    /// 执行操作直到成功或次数耗尽，返回最后一次的错误
    ///
    /// `on_retry(attempt, error, delay)` 在每次等待前调用，最后一次失败后不再等待
    pub async fn run<T, E, F, Fut, R>(&self, mut operation: F, mut on_retry: R) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        R: FnMut(u32, &E, Duration),
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if attempt + 1 >= max_attempts => return Err(err),
                Err(err) => {
                    let delay = self.backoff(attempt);
                    on_retry(attempt, &err, delay);
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
