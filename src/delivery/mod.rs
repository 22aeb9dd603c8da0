// ==========================================
// 防护对象阈值报表 - 投递层
// ==========================================
// 职责: 邮件正文渲染、SMTP 发送报表附件
// 边界: 只接收已写出的报表字节, 不参与报表生成
// ==========================================

pub mod dispatcher;
pub mod error;
pub mod message;
pub mod smtp;

pub use dispatcher::{Attachment, DeliveryDispatcher, Recipients};
pub use error::{DeliveryError, DeliveryResult};
pub use message::{render_body, BodyContext};
pub use smtp::SmtpDispatcher;
