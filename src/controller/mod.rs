// ==========================================
// 防护对象阈值报表 - 控制器访问层
// ==========================================
// 职责: 登录 (主备探测)、列出防护对象、拉取阈值与流量序列
// 边界: 只返回原始载荷, 不做归一化
// ==========================================

pub mod client;
pub mod error;
pub mod http_client;
pub mod payload;

pub use client::{ControllerClient, Session};
pub use error::{AuthError, FetchError, ALL_OBJECTS};
pub use http_client::HttpControllerClient;
