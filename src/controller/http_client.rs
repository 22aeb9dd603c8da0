// ==========================================
// 防护对象阈值报表 - 控制器 HTTP 客户端
// ==========================================
// 主备探测: 依次尝试主/备节点登录, 200 即活动节点
// 会话: Cookie 保持
// 超时: 每个请求统一超时 (配置)
// 重试: 超时 / 网络错误 / 5xx, 指数退避, 次数有上限
// ==========================================

use crate::config::ControllerConfig;
use crate::controller::client::{ControllerClient, Session};
use crate::controller::error::{AuthError, FetchError, ALL_OBJECTS};
use crate::controller::payload::{
    LoginFailure, LoginRequest, SecuritySettingsRequest, SecuritySettingsResponse, TimeInterval,
    TrafficRequest, TrafficResponse,
};
use crate::domain::raw::{RawMaxima, RawSeries, RawThresholdPayload};
use crate::domain::types::Protocol;
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const LOGIN_PATH: &str = "/mgmt/system/user/login";
const SECURITY_SETTINGS_PATH: &str =
    "/mgmt/v2/device/df/restv2/protected-objects/configure/security-settings/?includeNameSort=false";
const TRAFFIC_PATH: &str = "/mgmt/vrm/top-talkers/flow-detector";

/// 退避上限
const MAX_BACKOFF: Duration = Duration::from_secs(30);
/// 错误响应体截断长度
const ERROR_BODY_LIMIT: usize = 200;

// ==========================================
// 节点探测结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeStatus {
    Active,
    Standby,
    InvalidCredentials,
    Unexpected(u16),
    Unreachable(String),
}

// ==========================================
// HttpControllerClient
// ==========================================
pub struct HttpControllerClient {
    http: reqwest::Client,
    config: ControllerConfig,
}

impl HttpControllerClient {
    pub fn new(config: &ControllerConfig) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .danger_accept_invalid_certs(!config.verify_tls)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AuthError::ClientInit(e.to_string()))?;

        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    async fn probe(&self, base_url: &str) -> NodeStatus {
        let url = format!("{}{}", base_url, LOGIN_PATH);
        let body = LoginRequest {
            username: &self.config.username,
            password: &self.config.password,
        };

        let response = match self.http.post(&url).json(&body).send().await {
            Ok(r) => r,
            Err(e) => return NodeStatus::Unreachable(e.to_string()),
        };

        match response.status() {
            StatusCode::OK => NodeStatus::Active,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => NodeStatus::InvalidCredentials,
            StatusCode::SERVICE_UNAVAILABLE => {
                let failure = response.json::<LoginFailure>().await.unwrap_or_default();
                if failure.is_standby_node() {
                    NodeStatus::Standby
                } else {
                    NodeStatus::Unexpected(StatusCode::SERVICE_UNAVAILABLE.as_u16())
                }
            }
            other => NodeStatus::Unexpected(other.as_u16()),
        }
    }

    /// POST JSON 并解析响应, 带有限重试
    async fn post_json<B, T>(
        &self,
        url: &str,
        body: &B,
        object: &str,
        operation: &str,
    ) -> Result<T, FetchError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let mut attempt: u32 = 0;
        loop {
            match self.post_once(url, body, object, operation).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.config.retry_attempts => {
                    let delay = backoff_delay(self.config.retry_backoff_ms, attempt);
                    tracing::warn!(
                        object = object,
                        operation = operation,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "请求失败, 退避后重试"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn post_once<B, T>(
        &self,
        url: &str,
        body: &B,
        object: &str,
        operation: &str,
    ) -> Result<T, FetchError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.request_error(e, object, operation))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                object: object.to_string(),
                operation: operation.to_string(),
                status: status.as_u16(),
                body: truncate(&text, ERROR_BODY_LIMIT),
            });
        }

        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                self.request_error(e, object, operation)
            } else {
                FetchError::InvalidResponse {
                    object: object.to_string(),
                    operation: operation.to_string(),
                    message: e.to_string(),
                }
            }
        })
    }

    fn request_error(&self, err: reqwest::Error, object: &str, operation: &str) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                object: object.to_string(),
                operation: operation.to_string(),
                timeout_secs: self.config.request_timeout_secs,
            }
        } else {
            FetchError::Transport {
                object: object.to_string(),
                operation: operation.to_string(),
                message: err.to_string(),
            }
        }
    }

    async fn fetch_security_settings(
        &self,
        session: &Session,
        names: Vec<&str>,
        object: &str,
        operation: &str,
    ) -> Result<SecuritySettingsResponse, FetchError> {
        let url = format!("{}{}", session.controller_url, SECURITY_SETTINGS_PATH);
        let body = SecuritySettingsRequest {
            protected_object_names: names,
        };
        self.post_json(&url, &body, object, operation).await
    }
}

#[async_trait]
impl ControllerClient for HttpControllerClient {
    async fn authenticate(&self) -> Result<Session, AuthError> {
        let candidates = self.config.candidate_urls();
        if candidates.is_empty() {
            return Err(AuthError::NoControllerConfigured);
        }

        tracing::info!(candidates = ?candidates, "探测活动控制器");
        for url in &candidates {
            match self.probe(url).await {
                NodeStatus::Active => {
                    tracing::info!(url = %url, "活动控制器已登录");
                    return Ok(Session::new(url.clone()));
                }
                NodeStatus::Standby => {
                    tracing::warn!(url = %url, "备用节点 (非活动), 尝试下一个");
                }
                NodeStatus::InvalidCredentials => {
                    return Err(AuthError::InvalidCredentials { url: url.clone() });
                }
                NodeStatus::Unexpected(status) => {
                    tracing::warn!(url = %url, status, "登录返回异常状态");
                }
                NodeStatus::Unreachable(reason) => {
                    tracing::warn!(url = %url, reason = %reason, "控制器不可达");
                }
            }
        }

        Err(AuthError::NoActiveController { tried: candidates })
    }

    async fn list_objects(&self, session: &Session) -> Result<Vec<String>, FetchError> {
        let response = self
            .fetch_security_settings(session, Vec::new(), ALL_OBJECTS, "list_objects")
            .await?;

        Ok(response
            .protected_objects
            .into_iter()
            .map(|entry| entry.name_str().to_string())
            .collect())
    }

    async fn get_thresholds(
        &self,
        session: &Session,
        object_id: &str,
    ) -> Result<RawThresholdPayload, FetchError> {
        let response = self
            .fetch_security_settings(session, vec![object_id], object_id, "get_thresholds")
            .await?;

        let entry = response
            .protected_objects
            .into_iter()
            .find(|entry| entry.name_str() == object_id)
            .ok_or_else(|| FetchError::ObjectNotFound {
                object: object_id.to_string(),
            })?;

        Ok(RawThresholdPayload::from_value(
            entry.flow_detector_thresholds_host_details,
        ))
    }

    async fn get_max_traffic(
        &self,
        session: &Session,
        object_id: &str,
        lookback_days: u32,
    ) -> Result<RawMaxima, FetchError> {
        let from = lookback_start(Utc::now(), lookback_days).ok_or_else(|| {
            FetchError::Aborted {
                object: object_id.to_string(),
                reason: format!("回看天数超出时间范围: {}", lookback_days),
            }
        })?;
        let body = TrafficRequest {
            protected_object_name: object_id,
            time_interval: TimeInterval { from, to: None },
        };

        let mut maxima = RawMaxima::new();
        for protocol in Protocol::ALL {
            let url = format!(
                "{}{}/{}",
                session.controller_url,
                TRAFFIC_PATH,
                protocol.api_name()
            );
            let operation = format!("get_max_traffic/{}", protocol);
            let response: TrafficResponse =
                self.post_json(&url, &body, object_id, &operation).await?;
            maxima.insert(protocol, RawSeries::from_value(response.into_incoming()));
        }

        tracing::debug!(object = object_id, "流量序列拉取完成");
        Ok(maxima)
    }
}

/// 回看窗口起点 (epoch 毫秒); 超出日期范围时为 None
fn lookback_start(now: DateTime<Utc>, lookback_days: u32) -> Option<i64> {
    let window = TimeDelta::try_days(i64::from(lookback_days))?;
    now.checked_sub_signed(window).map(|start| start.timestamp_millis())
}

/// 第 attempt 次重试前的等待: base × 2^attempt, 上限 30s
fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    Duration::from_millis(base_ms.saturating_mul(factor)).min(MAX_BACKOFF)
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        let head: String = text.chars().take(limit).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_delay_doubles_and_caps() {
        assert_eq!(backoff_delay(500, 0), Duration::from_millis(500));
        assert_eq!(backoff_delay(500, 1), Duration::from_millis(1000));
        assert_eq!(backoff_delay(500, 3), Duration::from_millis(4000));
        assert_eq!(backoff_delay(500, 20), MAX_BACKOFF);
        assert_eq!(backoff_delay(500, 80), MAX_BACKOFF);
    }

    #[test]
    fn test_lookback_start() {
        let now = Utc::now();
        assert_eq!(
            lookback_start(now, 7),
            Some((now - TimeDelta::days(7)).timestamp_millis())
        );
        assert_eq!(lookback_start(now, 200_000_000), None);
        assert_eq!(lookback_start(now, u32::MAX), None);
    }

    #[tokio::test]
    async fn test_get_max_traffic_rejects_out_of_range_lookback() {
        let client = HttpControllerClient::new(&ControllerConfig::default()).unwrap();
        let session = Session::new("http://127.0.0.1:9");
        let err = client
            .get_max_traffic(&session, "web-01", 200_000_000)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Aborted { ref object, .. } if object == "web-01"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }

    #[tokio::test]
    async fn test_authenticate_without_urls() {
        let client = HttpControllerClient::new(&ControllerConfig::default()).unwrap();
        assert_eq!(
            client.authenticate().await.unwrap_err(),
            AuthError::NoControllerConfigured
        );
    }

    #[tokio::test]
    async fn test_unreachable_controller_reports_no_active() {
        let config = ControllerConfig {
            // 保留端口, 连接立即被拒
            primary_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 2,
            ..Default::default()
        };
        let client = HttpControllerClient::new(&config).unwrap();
        match client.authenticate().await.unwrap_err() {
            AuthError::NoActiveController { tried } => {
                assert_eq!(tried, vec!["http://127.0.0.1:9".to_string()]);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }
}
