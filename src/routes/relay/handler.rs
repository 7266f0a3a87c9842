use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    quota::{Decision, StoreUnavailable},
    utils::{error_codes, error_to_api_response, success_to_api_response},
};

use super::model::{QuotaStatusResponse, RelayRequest, RelayResponse};

/// 转发一次上游调用
/// 每次转发前恰好消费一个配额单位，被拒绝时不触达上游
#[axum::debug_handler]
pub async fn forward(
    State(state): State<AppState>,
    Json(req): Json<RelayRequest>,
) -> impl IntoResponse {
    let request_id = uuid::Uuid::new_v4().to_string();

    // 配额判定本身受超时保护，存储变慢不能拖死请求管线
    let outcome = match tokio::time::timeout(
        state.config.store_timeout(),
        state.quota.try_consume(),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => Err(StoreUnavailable::new("store round trip timed out")),
    };

    match outcome {
        Ok(Decision::Admitted) => {}
        Ok(Decision::Rejected) => {
            tracing::info!("request {} rejected: daily quota exhausted", request_id);
            return (
                StatusCode::OK,
                error_to_api_response(
                    error_codes::RATE_LIMIT,
                    "今日上游调用配额已用尽，请明日再试".to_string(),
                ),
            );
        }
        Err(err) if !state.config.quota_fail_open => {
            tracing::error!(
                "request {} denied, quota store unavailable: {}",
                request_id,
                err
            );
            return (
                StatusCode::OK,
                error_to_api_response(
                    error_codes::STORE_UNAVAILABLE,
                    "配额存储不可用，已按保守策略拒绝".to_string(),
                ),
            );
        }
        Err(err) => {
            // 运维显式开启了 QUOTA_FAIL_OPEN：存储故障期间放行，允许少量超发
            tracing::warn!(
                "request {} proceeding fail-open, quota store unavailable: {}",
                request_id,
                err
            );
        }
    }

    let upstream_response = match state
        .http
        .post(&state.config.upstream_url)
        .json(&req.payload)
        .send()
        .await
    {
        Ok(resp) => resp,
        Err(err) => {
            tracing::error!("request {} upstream call failed: {}", request_id, err);
            return (
                StatusCode::OK,
                error_to_api_response(error_codes::UPSTREAM_ERROR, "上游服务调用失败".to_string()),
            );
        }
    };

    if !upstream_response.status().is_success() {
        let status = upstream_response.status();
        tracing::error!("request {} upstream returned {}", request_id, status);
        return (
            StatusCode::OK,
            error_to_api_response(
                error_codes::UPSTREAM_ERROR,
                format!("上游服务返回异常状态: {}", status),
            ),
        );
    }

    match upstream_response.json::<serde_json::Value>().await {
        Ok(upstream) => (
            StatusCode::OK,
            success_to_api_response(RelayResponse {
                request_id,
                upstream,
            }),
        ),
        Err(err) => {
            tracing::error!(
                "request {} failed to decode upstream body: {}",
                request_id,
                err
            );
            (
                StatusCode::OK,
                error_to_api_response(error_codes::UPSTREAM_ERROR, "上游响应解析失败".to_string()),
            )
        }
    }
}

/// 查询今日配额使用情况
#[axum::debug_handler]
pub async fn quota_status(State(state): State<AppState>) -> impl IntoResponse {
    match state.quota.used_today().await {
        Ok(used) => {
            let limit = state.quota.limit();
            (
                StatusCode::OK,
                success_to_api_response(QuotaStatusResponse {
                    date: chrono::Utc::now().date_naive().format("%Y%m%d").to_string(),
                    limit,
                    used,
                    remaining: u64::from(limit).saturating_sub(used),
                }),
            )
        }
        Err(err) => {
            tracing::error!("failed to read quota usage: {}", err);
            (
                StatusCode::OK,
                error_to_api_response(error_codes::STORE_UNAVAILABLE, "配额存储不可用".to_string()),
            )
        }
    }
}
