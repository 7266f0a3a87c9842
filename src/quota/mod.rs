// 配额模块
// 每日上游调用计数器，原子性完全依赖共享存储

pub mod counter;
pub mod keys;
pub mod store;

// 重新导出常用类型，方便其他模块使用
pub use counter::{DailyRequestCounter, Decision, QuotaConfigError};
pub use store::{CounterStore, RedisCounterStore, StoreUnavailable};
