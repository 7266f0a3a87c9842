use serde::{Deserialize, Serialize};

/// 转发请求，payload 原样交给上游
#[derive(Debug, Deserialize)]
pub struct RelayRequest {
    pub payload: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct RelayResponse {
    /// 本次转发的关联ID，与日志对应
    pub request_id: String,
    /// 上游返回的原始JSON
    pub upstream: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct QuotaStatusResponse {
    /// UTC 日期，格式 YYYYMMDD
    pub date: String,
    pub limit: u32,
    pub used: u64,
    pub remaining: u64,
}
