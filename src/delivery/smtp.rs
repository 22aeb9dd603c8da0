// ==========================================
// 防护对象阈值报表 - SMTP 投递实现
// ==========================================
// 安全模式: STARTTLS (587) / 隐式 TLS (465) / 明文 (25)
// 用户名与密码均配置时才认证, 否则匿名发送
// ==========================================

use crate::config::{EmailConfig, SmtpSecurity};
use crate::delivery::dispatcher::{Attachment, DeliveryDispatcher, Recipients};
use crate::delivery::error::{DeliveryError, DeliveryResult};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as MailAttachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

pub struct SmtpDispatcher {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    server: String,
}

impl SmtpDispatcher {
    pub fn new(config: &EmailConfig) -> DeliveryResult<Self> {
        let from = parse_mailbox(&config.from)?;
        let host = config.smtp_server.trim();

        let builder = match config.security {
            SmtpSecurity::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .map_err(|e| DeliveryError::Transport(e.to_string()))?,
            SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                .map_err(|e| DeliveryError::Transport(e.to_string()))?,
            SmtpSecurity::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host),
        };

        let mut builder = builder
            .port(config.smtp_port)
            .timeout(Some(Duration::from_secs(config.timeout_secs)));

        match (config.username.as_deref(), config.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => {
                builder = builder.credentials(Credentials::new(user.to_string(), pass.to_string()));
            }
            _ => {
                tracing::info!("未配置 SMTP 凭据, 使用匿名发送");
            }
        }

        Ok(Self {
            transport: builder.build(),
            from,
            server: format!("{}:{}", host, config.smtp_port),
        })
    }

    /// 启动前连通性检查 (连接 + 认证)
    pub async fn check_connection(&self) -> DeliveryResult<bool> {
        tracing::info!(server = %self.server, "测试 SMTP 连接");
        Ok(self.transport.test_connection().await?)
    }

    /// 构建带附件的邮件
    pub fn build_message(
        &self,
        attachment: Attachment<'_>,
        recipients: &Recipients,
        subject: &str,
        body: &str,
    ) -> DeliveryResult<Message> {
        if recipients.to.is_empty() {
            return Err(DeliveryError::NoRecipients);
        }

        let mut builder = Message::builder().from(self.from.clone()).subject(subject);
        for address in &recipients.to {
            builder = builder.to(parse_mailbox(address)?);
        }
        for address in &recipients.cc {
            builder = builder.cc(parse_mailbox(address)?);
        }

        let content_type = ContentType::parse(attachment.content_type)
            .map_err(|e| DeliveryError::MessageBuild(e.to_string()))?;
        let file_part = MailAttachment::new(attachment.filename.to_string())
            .body(attachment.bytes.to_vec(), content_type);

        let message = builder.multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(body.to_string()))
                .singlepart(file_part),
        )?;
        Ok(message)
    }
}

#[async_trait]
impl DeliveryDispatcher for SmtpDispatcher {
    async fn send(
        &self,
        attachment: Attachment<'_>,
        recipients: &Recipients,
        subject: &str,
        body: &str,
    ) -> DeliveryResult<()> {
        let message = self.build_message(attachment, recipients, subject, body)?;
        let all: Vec<&str> = recipients.all().collect();

        tracing::info!(
            server = %self.server,
            recipients = ?all,
            subject = subject,
            attachment = attachment.filename,
            "发送报表邮件"
        );
        self.transport.send(message).await?;
        tracing::info!(recipients = all.len(), "邮件发送成功");
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> DeliveryResult<Mailbox> {
    address
        .trim()
        .parse::<Mailbox>()
        .map_err(|e| DeliveryError::InvalidAddress {
            address: address.to_string(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EmailConfig {
        EmailConfig {
            enabled: true,
            smtp_server: "smtp.example.com".to_string(),
            from: "reports@example.com".to_string(),
            to: vec!["soc@example.com".to_string()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_build_message_with_attachment() {
        let dispatcher = SmtpDispatcher::new(&config()).unwrap();
        let recipients = Recipients::new(
            vec!["soc@example.com".to_string()],
            vec!["noc@example.com".to_string()],
        );
        let attachment = Attachment {
            bytes: b"PK\x03\x04",
            filename: "report.xlsx",
            content_type: "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        };

        let message = dispatcher
            .build_message(attachment, &recipients, "Weekly report", "hello")
            .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("Subject: Weekly report"));
        assert!(raw.contains("soc@example.com"));
        assert!(raw.contains("Cc: noc@example.com"));
        assert!(raw.contains("report.xlsx"));
    }

    #[tokio::test]
    async fn test_invalid_address_rejected() {
        let dispatcher = SmtpDispatcher::new(&config()).unwrap();
        let recipients = Recipients::new(vec!["not-an-address".to_string()], vec![]);
        let attachment = Attachment {
            bytes: b"",
            filename: "r.csv",
            content_type: "text/csv",
        };
        let err = dispatcher
            .build_message(attachment, &recipients, "s", "b")
            .unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidAddress { .. }));
    }

    #[tokio::test]
    async fn test_empty_recipients_rejected() {
        let dispatcher = SmtpDispatcher::new(&config()).unwrap();
        let attachment = Attachment {
            bytes: b"",
            filename: "r.csv",
            content_type: "text/csv",
        };
        let err = dispatcher
            .build_message(attachment, &Recipients::default(), "s", "b")
            .unwrap_err();
        assert!(matches!(err, DeliveryError::NoRecipients));
    }
}
