// ==========================================
// 防护对象阈值报表 - 投递错误类型
// ==========================================
// 投递失败不影响已写出的报表文件
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("收件人为空")]
    NoRecipients,

    #[error("邮箱地址无效 ({address}): {message}")]
    InvalidAddress { address: String, message: String },

    #[error("邮件构建失败: {0}")]
    MessageBuild(String),

    #[error("SMTP 传输初始化失败: {0}")]
    Transport(String),

    #[error("邮件发送失败: {0}")]
    Send(String),
}

impl From<lettre::error::Error> for DeliveryError {
    fn from(err: lettre::error::Error) -> Self {
        DeliveryError::MessageBuild(err.to_string())
    }
}

impl From<lettre::transport::smtp::Error> for DeliveryError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        DeliveryError::Send(err.to_string())
    }
}

/// Result 类型别名
pub type DeliveryResult<T> = Result<T, DeliveryError>;
