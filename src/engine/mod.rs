// ==========================================
// 防护对象阈值报表 - 引擎层
// ==========================================
// 职责: 原始载荷归一化 + 阈值违规评估
// 红线: 纯函数, 不访问网络, 不读时钟
// ==========================================

pub mod error;
pub mod evaluator;
pub mod normalizer;

// 重导出核心引擎
pub use error::{EngineError, EngineResult};
pub use evaluator::{ThresholdFraction, ViolationEvaluator, DEFAULT_THRESHOLD_FRACTION};
pub use normalizer::RecordNormalizer;
