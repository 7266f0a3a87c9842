use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use quota_gate::quota::{CounterStore, StoreUnavailable};

/// 测试用的进程内计数器存储
/// 与 Redis 实现遵守同一契约：自增串行化、TTL 只在键首次创建时设置、
/// 回滚对不存在的键不生效；仅作测试替身，线上不允许进程内实现
pub struct MemoryCounterStore {
    entries: Mutex<HashMap<String, Entry>>,
    unreachable: AtomicBool,
    fail_decrements: AtomicBool,
}

struct Entry {
    count: i64,
    expires_at: Instant,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            unreachable: AtomicBool::new(false),
            fail_decrements: AtomicBool::new(false),
        }
    }

    /// 模拟整个存储不可达
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// 模拟只有补偿自减失败
    pub fn set_decrement_failing(&self, failing: bool) {
        self.fail_decrements.store(failing, Ordering::SeqCst);
    }

    /// 当前存量计数，过期键视为 0
    pub fn stored_count(&self, key: &str) -> i64 {
        let entries = self.entries.lock().unwrap();
        entries
            .get(key)
            .filter(|e| e.expires_at > Instant::now())
            .map(|e| e.count)
            .unwrap_or(0)
    }

    fn check_reachable(&self) -> Result<(), StoreUnavailable> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(StoreUnavailable::new("simulated outage"));
        }
        Ok(())
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn increment_with_expiry(&self, key: &str, ttl_secs: u64) -> Result<u64, StoreUnavailable> {
        self.check_reachable()?;

        let mut entries = self.entries.lock().unwrap();
        let now = Instant::now();

        // 过期键等同于不存在
        if entries.get(key).is_some_and(|e| e.expires_at <= now) {
            entries.remove(key);
        }

        let entry = entries.entry(key.to_string()).or_insert(Entry {
            count: 0,
            expires_at: now + Duration::from_secs(ttl_secs),
        });
        entry.count += 1;

        Ok(entry.count.max(0) as u64)
    }

    async fn decrement_if_present(&self, key: &str) -> Result<(), StoreUnavailable> {
        self.check_reachable()?;
        if self.fail_decrements.load(Ordering::SeqCst) {
            return Err(StoreUnavailable::new("simulated rollback failure"));
        }

        let mut entries = self.entries.lock().unwrap();
        let now = Instant::now();

        if let Some(entry) = entries.get_mut(key) {
            if entry.expires_at > now {
                entry.count -= 1;
            } else {
                entries.remove(key);
            }
        }

        Ok(())
    }

    async fn current(&self, key: &str) -> Result<u64, StoreUnavailable> {
        self.check_reachable()?;

        let entries = self.entries.lock().unwrap();
        Ok(entries
            .get(key)
            .filter(|e| e.expires_at > Instant::now())
            .map(|e| e.count.max(0) as u64)
            .unwrap_or(0))
    }
}
