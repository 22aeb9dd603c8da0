// ==========================================
// 防护对象阈值报表 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 引擎层错误类型 (归一化 / 评估)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// 单个对象载荷不可用
    #[error("记录格式错误 (对象: {object}, 字段: {field}): {message}")]
    MalformedRecord {
        object: String,
        field: String,
        message: String,
    },

    /// 阈值比例必须落在 (0, 1]
    #[error("阈值比例无效: {0}（取值范围 (0, 1]）")]
    InvalidFraction(f64),
}

impl EngineError {
    pub fn malformed(
        object: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        EngineError::MalformedRecord {
            object: object.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// 出错对象名 (若有)
    pub fn object(&self) -> Option<&str> {
        match self {
            EngineError::MalformedRecord { object, .. } => Some(object),
            EngineError::InvalidFraction(_) => None,
        }
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
