use config::Config;
use quota::DailyRequestCounter;
use std::sync::Arc;

pub mod config;
pub mod middleware;
pub mod quota;
pub mod utils;

pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub quota: Arc<DailyRequestCounter>,
    pub http: reqwest::Client,
}
