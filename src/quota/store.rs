use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient, Script};

/// 共享存储不可用
/// 原子操作未能提交时返回；不在此处重试，由调用方决定失败策略
#[derive(Debug, Clone)]
pub struct StoreUnavailable {
    pub reason: String,
}

impl StoreUnavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for StoreUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "counter store unavailable: {}", self.reason)
    }
}

impl std::error::Error for StoreUnavailable {}

impl From<redis::RedisError> for StoreUnavailable {
    fn from(err: redis::RedisError) -> Self {
        Self::new(err.to_string())
    }
}

/// 计数器存储接口
/// 自增必须由存储侧串行化，进程内不得用锁模拟原子性
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// 原子自增并在键首次创建时设置过期时间，返回自增后的值
    async fn increment_with_expiry(&self, key: &str, ttl_secs: u64) -> Result<u64, StoreUnavailable>;

    /// 键存在时自减一次，键不存在时不做任何操作
    async fn decrement_if_present(&self, key: &str) -> Result<(), StoreUnavailable>;

    /// 读取当前计数，键不存在视为 0
    async fn current(&self, key: &str) -> Result<u64, StoreUnavailable>;
}

/// 基于 Redis 的计数器存储
pub struct RedisCounterStore {
    client: Arc<RedisClient>,
    incr_script: Script,
    decr_script: Script,
}

impl RedisCounterStore {
    pub fn new(client: Arc<RedisClient>) -> Self {
        Self {
            client,
            // INCR 和 EXPIRE 必须在同一原子单元内完成，
            // 否则存在计数器已自增但永不过期的窗口
            incr_script: Script::new(
                r#"
local count = redis.call('INCR', KEYS[1])
if count == 1 then
    redis.call('EXPIRE', KEYS[1], ARGV[1])
end
return count
"#,
            ),
            // 回滚只在键仍存在时执行，避免 DECR 把已过期的键复活成负值常驻键
            decr_script: Script::new(
                r#"
if redis.call('EXISTS', KEYS[1]) == 1 then
    redis.call('DECR', KEYS[1])
end
return 0
"#,
            ),
        }
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn increment_with_expiry(&self, key: &str, ttl_secs: u64) -> Result<u64, StoreUnavailable> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let count: u64 = self
            .incr_script
            .key(key)
            .arg(ttl_secs)
            .invoke_async(&mut conn)
            .await?;

        Ok(count)
    }

    async fn decrement_if_present(&self, key: &str) -> Result<(), StoreUnavailable> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let _: i64 = self.decr_script.key(key).invoke_async(&mut conn).await?;

        Ok(())
    }

    async fn current(&self, key: &str) -> Result<u64, StoreUnavailable> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let count: Option<u64> = conn.get(key).await?;

        Ok(count.unwrap_or(0))
    }
}
