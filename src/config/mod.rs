// ==========================================
// 防护对象阈值报表 - 配置层
// ==========================================
// 职责: 配置加载、环境变量覆写、启动期校验
// 存储: JSON 配置文件
// ==========================================

pub mod error;
pub mod report_config;

// 重导出核心配置类型
pub use error::{ConfigError, ConfigResult};
pub use report_config::{
    env_keys, ControllerConfig, EmailConfig, MalformedPolicy, ReportConfig, ReportSettings,
    SmtpSecurity, MAX_LOOKBACK_DAYS,
};
