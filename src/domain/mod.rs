// ==========================================
// 防护对象阈值报表 - 领域模型层
// ==========================================
// 职责: 定义协议/指标类型、对象报告实体、控制器原始载荷
// 红线: 不含网络访问, 不含渲染逻辑
// ==========================================

pub mod raw;
pub mod report;
pub mod types;

// 重导出核心类型
pub use raw::{
    RawMaxima, RawSample, RawSampleRow, RawSeries, RawThresholdPayload, RawThresholds,
    RawTrafficSeries,
};
pub use report::{ObjectReport, ProtocolMetricSet, ProtocolMetrics};
pub use types::{Measure, MetricKey, Protocol};
