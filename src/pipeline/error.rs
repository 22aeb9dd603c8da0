// ==========================================
// 防护对象阈值报表 - 管道错误类型
// ==========================================
// 每个错误都带所在阶段; 涉及对象时带对象名
// 投递失败不在此列 (见 RunSummary::delivery)
// ==========================================

use crate::controller::error::{AuthError, FetchError};
use crate::engine::error::EngineError;
use crate::report::error::RenderError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// 管道阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Fetch,
    Normalize,
    Evaluate,
    Render,
    Deliver,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Fetch => "fetch",
            Stage::Normalize => "normalize",
            Stage::Evaluate => "evaluate",
            Stage::Render => "render",
            Stage::Deliver => "deliver",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("[fetch] 控制器登录失败: {0}")]
    Auth(#[from] AuthError),

    #[error("[fetch] {0}")]
    Fetch(#[from] FetchError),

    #[error("[normalize] {0}")]
    Normalize(EngineError),

    #[error("[render] {0}")]
    Render(#[from] RenderError),
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Auth(_) | PipelineError::Fetch(_) => Stage::Fetch,
            PipelineError::Normalize(_) => Stage::Normalize,
            PipelineError::Render(_) => Stage::Render,
        }
    }

    /// 出错对象名 (若有)
    pub fn object(&self) -> Option<&str> {
        match self {
            PipelineError::Fetch(e) => Some(e.object()),
            PipelineError::Normalize(e) => e.object(),
            PipelineError::Auth(_) | PipelineError::Render(_) => None,
        }
    }
}

/// Result 类型别名
pub type PipelineResult<T> = Result<T, PipelineError>;
