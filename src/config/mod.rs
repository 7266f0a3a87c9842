use std::env;
use std::time::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub redis_url: String,
    pub upstream_url: String,
    pub daily_limit: u32,
    pub quota_ttl_hours: u32,
    pub quota_fail_open: bool,
    pub store_timeout_secs: u64,
    pub upstream_timeout_secs: u64,
    pub server_host: String,
    pub server_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        let quota_ttl_hours = env::var("QUOTA_TTL_HOURS")?.parse::<u32>().unwrap_or(48);
        // 存储故障时的默认策略为拒绝放行，放行需要运维显式开启
        let quota_fail_open = env::var("QUOTA_FAIL_OPEN")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Config {
            redis_url: env::var("REDIS_URL")?,
            upstream_url: env::var("UPSTREAM_URL")?,
            server_host: env::var("SERVER_HOST")?,
            server_port: env::var("SERVER_PORT")?.parse().unwrap_or(3000),
            daily_limit: env::var("DAILY_LIMIT")?.parse().unwrap_or(100),
            quota_ttl_hours,
            quota_fail_open,
            store_timeout_secs: env::var("STORE_TIMEOUT_SECS")
                .map(|v| v.parse().unwrap_or(5))
                .unwrap_or(5),
            upstream_timeout_secs: env::var("UPSTREAM_TIMEOUT_SECS")
                .map(|v| v.parse().unwrap_or(30))
                .unwrap_or(30),
        })
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}
