// ==========================================
// 防护对象阈值报表 - 控制器访问错误类型
// ==========================================
// AuthError: 登录 / 主备探测失败
// FetchError: 数据拉取失败, 必带对象名与操作名
// ==========================================

use thiserror::Error;

/// 列表类请求的对象占位名
pub const ALL_OBJECTS: &str = "*";

/// 认证错误 (整次运行致命)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    #[error("未配置控制器地址")]
    NoControllerConfigured,

    #[error("控制器拒绝登录 ({url}): 用户名或密码错误")]
    InvalidCredentials { url: String },

    #[error("未找到可用的控制器 (已尝试: {})", .tried.join(", "))]
    NoActiveController { tried: Vec<String> },

    #[error("HTTP 客户端初始化失败: {0}")]
    ClientInit(String),
}

/// 拉取错误 (整次运行致命)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("请求超时 (对象: {object}, 操作: {operation}, 超时: {timeout_secs}s)")]
    Timeout {
        object: String,
        operation: String,
        timeout_secs: u64,
    },

    #[error("HTTP 状态异常 (对象: {object}, 操作: {operation}): {status} {body}")]
    Status {
        object: String,
        operation: String,
        status: u16,
        body: String,
    },

    #[error("网络请求失败 (对象: {object}, 操作: {operation}): {message}")]
    Transport {
        object: String,
        operation: String,
        message: String,
    },

    #[error("响应解析失败 (对象: {object}, 操作: {operation}): {message}")]
    InvalidResponse {
        object: String,
        operation: String,
        message: String,
    },

    #[error("控制器未返回该对象: {object}")]
    ObjectNotFound { object: String },

    #[error("拉取已中止 (对象: {object}): {reason}")]
    Aborted { object: String, reason: String },
}

impl FetchError {
    /// 出错对象名
    pub fn object(&self) -> &str {
        match self {
            FetchError::Timeout { object, .. }
            | FetchError::Status { object, .. }
            | FetchError::Transport { object, .. }
            | FetchError::InvalidResponse { object, .. }
            | FetchError::ObjectNotFound { object }
            | FetchError::Aborted { object, .. } => object,
        }
    }

    /// 是否值得重试 (超时 / 网络 / 5xx)
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Timeout { .. } | FetchError::Transport { .. } => true,
            FetchError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
