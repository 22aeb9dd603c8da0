// ==========================================
// 防护对象阈值报表 - 控制器客户端 Trait
// ==========================================
// 用途: 报表管道唯一的数据来源接口
// 实现者: HttpControllerClient (测试中为 Mock)
// ==========================================

use crate::controller::error::{AuthError, FetchError};
use crate::domain::raw::{RawMaxima, RawThresholdPayload};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

// ==========================================
// Session - 已登录的控制器会话
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// 当前活动节点地址 (主备探测结果)
    pub controller_url: String,
    pub established_at: DateTime<Utc>,
}

impl Session {
    pub fn new(controller_url: impl Into<String>) -> Self {
        Self {
            controller_url: controller_url.into(),
            established_at: Utc::now(),
        }
    }
}

// ==========================================
// ControllerClient Trait
// ==========================================
#[async_trait]
pub trait ControllerClient: Send + Sync {
    /// 登录控制器 (含主备探测)
    async fn authenticate(&self) -> Result<Session, AuthError>;

    /// 列出全部防护对象名
    async fn list_objects(&self, session: &Session) -> Result<Vec<String>, FetchError>;

    /// 拉取单个对象的流量检测激活阈值
    async fn get_thresholds(
        &self,
        session: &Session,
        object_id: &str,
    ) -> Result<RawThresholdPayload, FetchError>;

    /// 拉取单个对象回看窗口内各协议的流量序列
    async fn get_max_traffic(
        &self,
        session: &Session,
        object_id: &str,
        lookback_days: u32,
    ) -> Result<RawMaxima, FetchError>;
}
