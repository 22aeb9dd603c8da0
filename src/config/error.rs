// ==========================================
// 防护对象阈值报表 - 配置层错误类型
// ==========================================

use crate::engine::error::EngineError;
use thiserror::Error;

/// 配置错误 (启动期致命)
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {0}")]
    FileNotFound(String),

    #[error("配置文件读取失败 ({path}): {message}")]
    FileReadError { path: String, message: String },

    #[error("配置解析失败: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },

    #[error("无法确定默认配置路径, 请通过 --config 指定")]
    NoDefaultPath,

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl ConfigError {
    pub fn value(key: &str, value: impl ToString, message: impl Into<String>) -> Self {
        ConfigError::ConfigValueError {
            key: key.to_string(),
            value: value.to_string(),
            message: message.into(),
        }
    }
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
