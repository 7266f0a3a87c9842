use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};

use super::keys;
use super::store::{CounterStore, StoreUnavailable};

/// 单次回滚的最长等待时间，超时即放弃本次补偿
const ROLLBACK_TIMEOUT: Duration = Duration::from_secs(2);

/// 配额参数不合法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaConfigError {
    /// 每日上限必须为正数
    ZeroLimit,
    /// TTL 不足 24 小时时计数器会在所计量的当天内被回收
    TtlTooShort(u32),
}

impl fmt::Display for QuotaConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuotaConfigError::ZeroLimit => write!(f, "daily limit must be positive"),
            QuotaConfigError::TtlTooShort(hours) => {
                write!(f, "counter ttl must be at least 24 hours, got {}", hours)
            }
        }
    }
}

impl std::error::Error for QuotaConfigError {}

/// 单次配额消费的判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// 计数未超上限，放行
    Admitted,
    /// 当日上限已满，拒绝
    Rejected,
}

impl Decision {
    pub fn is_admitted(self) -> bool {
        matches!(self, Decision::Admitted)
    }
}

/// 每日请求计数器
/// 以共享存储的原子自增限制每个 UTC 日历日内放行的上游调用数，
/// 多实例并发调用时不依赖任何进程内锁
pub struct DailyRequestCounter {
    store: Arc<dyn CounterStore>,
    limit: u32,
    ttl_secs: u64,
}

impl DailyRequestCounter {
    pub fn new(
        store: Arc<dyn CounterStore>,
        limit: u32,
        ttl_hours: u32,
    ) -> Result<Self, QuotaConfigError> {
        if limit == 0 {
            return Err(QuotaConfigError::ZeroLimit);
        }
        if ttl_hours < 24 {
            return Err(QuotaConfigError::TtlTooShort(ttl_hours));
        }

        Ok(Self {
            store,
            limit,
            ttl_secs: u64::from(ttl_hours) * 3600,
        })
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// 消费今日（UTC）的一个配额单位
    pub async fn try_consume(&self) -> Result<Decision, StoreUnavailable> {
        self.try_consume_on(Utc::now().date_naive()).await
    }

    /// 消费指定日期的一个配额单位
    /// 先自增后判定：自增结果不超过上限即放行，超过则拒绝并尽力回滚；
    /// 不同日期的计数器相互独立
    pub async fn try_consume_on(&self, day: NaiveDate) -> Result<Decision, StoreUnavailable> {
        let key = keys::daily_counter_key(day);

        let count = self.store.increment_with_expiry(&key, self.ttl_secs).await?;

        if count <= u64::from(self.limit) {
            return Ok(Decision::Admitted);
        }

        // 补偿自减放在独立任务上执行：调用方在自增提交后被取消时，
        // 回滚仍会运行；失败只记日志，计数器可以短暂偏大，不能偏小
        let store = Arc::clone(&self.store);
        let rollback = tokio::spawn(async move {
            match tokio::time::timeout(ROLLBACK_TIMEOUT, store.decrement_if_present(&key)).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    tracing::warn!("quota rollback failed for {}: {}", key, err);
                }
                Err(_) => {
                    tracing::warn!("quota rollback timed out for {}", key);
                }
            }
        });
        // 未被取消时等待回滚完成，让拒绝后的计数及时回落
        let _ = rollback.await;

        Ok(Decision::Rejected)
    }

    /// 今日已用计数，只读，不参与判定
    pub async fn used_today(&self) -> Result<u64, StoreUnavailable> {
        let key = keys::daily_counter_key(Utc::now().date_naive());
        self.store.current(&key).await
    }
}
