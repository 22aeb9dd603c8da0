// ==========================================
// 防护对象阈值报表 - 投递 Trait
// ==========================================
// 用途: 将已渲染的报表字节作为附件发出
// 实现者: SmtpDispatcher (测试中为 Mock)
// ==========================================

use crate::delivery::error::DeliveryResult;
use async_trait::async_trait;

/// 收件人 (To + Cc)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recipients {
    pub to: Vec<String>,
    pub cc: Vec<String>,
}

impl Recipients {
    pub fn new(to: Vec<String>, cc: Vec<String>) -> Self {
        Self { to, cc }
    }

    pub fn is_empty(&self) -> bool {
        self.to.is_empty() && self.cc.is_empty()
    }

    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.to.iter().chain(self.cc.iter()).map(String::as_str)
    }
}

/// 单个附件
#[derive(Debug, Clone, Copy)]
pub struct Attachment<'a> {
    pub bytes: &'a [u8],
    pub filename: &'a str,
    pub content_type: &'a str,
}

#[async_trait]
pub trait DeliveryDispatcher: Send + Sync {
    /// 发送报表
    async fn send(
        &self,
        attachment: Attachment<'_>,
        recipients: &Recipients,
        subject: &str,
        body: &str,
    ) -> DeliveryResult<()>;
}
