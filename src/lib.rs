// ==========================================
// 防护对象阈值报表 - 核心库
// ==========================================
// 用途: 从 DefensePro 控制器拉取防护对象的流量检测阈值
//       与回看窗口内的实际流量最大值, 标出阈值偏低的对象
// 产出: 带高亮的 Excel / CSV 报表, 可选邮件投递
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 类型、实体与原始载荷
pub mod domain;

// 引擎层 - 归一化与违规评估
pub mod engine;

// 配置层 - 运行配置
pub mod config;

// 控制器访问层 - HTTP 客户端
pub mod controller;

// 报表层 - 布局构建与渲染
pub mod report;

// 投递层 - SMTP 邮件
pub mod delivery;

// 管道层 - 单次运行编排
pub mod pipeline;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{Measure, MetricKey, ObjectReport, Protocol, ProtocolMetrics};

// 引擎
pub use engine::{EngineError, RecordNormalizer, ThresholdFraction, ViolationEvaluator};

// 配置
pub use config::{ConfigError, MalformedPolicy, ReportConfig};

// 控制器
pub use controller::{AuthError, ControllerClient, FetchError, HttpControllerClient, Session};

// 报表
pub use report::{ArtifactRenderer, ReportArtifact, ReportBuilder, ReportFormat};

// 投递
pub use delivery::{DeliveryDispatcher, DeliveryError, SmtpDispatcher};

// 管道
pub use pipeline::{DeliveryStatus, PipelineError, ReportPipeline, RunSummary};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "防护对象流量检测阈值报表";
