// ==========================================
// 防护对象阈值报表 - 控制器响应信封
// ==========================================
// 只解析信封层; 对象级数据以原始 JSON 交给 domain::raw
// ==========================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ==========================================
// 登录
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// 503 响应体; 备用节点返回 "Login to Inactive node is not Permitted"
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginFailure {
    pub status: Option<String>,
    pub message: Option<String>,
}

pub const INACTIVE_NODE_MESSAGE: &str = "Login to Inactive node is not Permitted";

impl LoginFailure {
    pub fn is_standby_node(&self) -> bool {
        let message_hit = self
            .message
            .as_deref()
            .is_some_and(|m| m.contains(INACTIVE_NODE_MESSAGE));
        let status_hit = self.status.as_deref().is_some_and(|s| s.contains("error"));
        message_hit || status_hit
    }
}

// ==========================================
// 防护对象安全配置
// ==========================================
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySettingsRequest<'a> {
    /// 空列表 = 全部对象
    pub protected_object_names: Vec<&'a str>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecuritySettingsResponse {
    pub protected_objects: Vec<ProtectedObjectEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProtectedObjectEntry {
    /// 控制器偶有 null / 非字符串名称, 不能让整张列表解析失败
    pub name: Option<Value>,
    pub flow_detector_thresholds_host_details: Option<Value>,
}

impl ProtectedObjectEntry {
    /// 字符串名称; 缺失或非字符串时为空串 (由归一化器判为格式错误)
    pub fn name_str(&self) -> &str {
        match &self.name {
            Some(Value::String(name)) => name,
            _ => "",
        }
    }
}

// ==========================================
// 流量 Top Talkers
// ==========================================
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficRequest<'a> {
    pub protected_object_name: &'a str,
    pub time_interval: TimeInterval,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimeInterval {
    /// 起始时间 (epoch 毫秒)
    pub from: i64,
    /// None = 至今
    pub to: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrafficResponse {
    pub data_map: Option<TrafficDataMap>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TrafficDataMap {
    pub incoming: Option<Value>,
}

impl TrafficResponse {
    pub fn into_incoming(self) -> Option<Value> {
        self.data_map.and_then(|d| d.incoming)
    }
}
