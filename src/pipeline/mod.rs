// ==========================================
// 防护对象阈值报表 - 报表管道层
// ==========================================
// 职责: 串联控制器拉取、引擎评估、报表渲染与投递
// 依赖注入: ControllerClient / DeliveryDispatcher 均为 trait 对象
// ==========================================

pub mod error;
pub mod orchestrator;

pub use error::{PipelineError, PipelineResult, Stage};
pub use orchestrator::{DeliveryStatus, ReportPipeline, RunSummary, SkippedObject};
