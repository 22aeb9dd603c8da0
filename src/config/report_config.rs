// ==========================================
// 防护对象阈值报表 - 运行配置
// ==========================================
// 来源: JSON 配置文件 + 环境变量覆写 (凭据)
// 进程启动时加载一次, 之后以不可变值 (Arc) 传入各组件
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::engine::evaluator::{ThresholdFraction, DEFAULT_THRESHOLD_FRACTION};
use crate::report::renderer::ReportFormat;
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 默认配置目录名
pub const CONFIG_DIR_NAME: &str = "po-threshold-report";
pub const CONFIG_FILE_NAME: &str = "config.json";

/// 文件名模板中的时间戳占位符
pub const TIMESTAMP_PLACEHOLDER: &str = "{timestamp}";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// 回看天数上限 (10 年)
pub const MAX_LOOKBACK_DAYS: u32 = 3650;

// ==========================================
// 环境变量 (凭据覆写)
// ==========================================
pub mod env_keys {
    pub const CC_USERNAME: &str = "CC_USERNAME";
    pub const CC_PASSWORD: &str = "CC_PASSWORD";
    pub const SMTP_USERNAME: &str = "SMTP_USERNAME";
    pub const SMTP_PASSWORD: &str = "SMTP_PASSWORD";
}

// ==========================================
// 控制器连接配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub primary_url: String,
    /// 备用节点 (HA), 可选
    pub secondary_url: Option<String>,
    pub username: String,
    pub password: String,
    /// 控制器普遍使用自签名证书, 默认不校验
    pub verify_tls: bool,
    pub request_timeout_secs: u64,
    pub max_concurrency: usize,
    pub retry_attempts: u32,
    pub retry_backoff_ms: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            primary_url: String::new(),
            secondary_url: None,
            username: String::new(),
            password: String::new(),
            verify_tls: false,
            request_timeout_secs: 30,
            max_concurrency: 4,
            retry_attempts: 2,
            retry_backoff_ms: 500,
        }
    }
}

impl ControllerConfig {
    /// 按优先级排列的控制器地址 (主 → 备)
    pub fn candidate_urls(&self) -> Vec<String> {
        std::iter::once(self.primary_url.as_str())
            .chain(self.secondary_url.as_deref())
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .collect()
    }
}

// ==========================================
// 格式错误记录的处理策略
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// 记录告警并跳过该对象, 其余对象照常出表
    #[default]
    Skip,
    /// 整次运行失败
    Abort,
}

// ==========================================
// 报表配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub lookback_days: u32,
    pub threshold_fraction: f64,
    pub output_filename_template: String,
    pub output_dir: PathBuf,
    pub format: ReportFormat,
    pub on_malformed: MalformedPolicy,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            lookback_days: 7,
            threshold_fraction: DEFAULT_THRESHOLD_FRACTION,
            output_filename_template: "po_flow_detector_thresholds_{timestamp}".to_string(),
            output_dir: PathBuf::from("."),
            format: ReportFormat::Xlsx,
            on_malformed: MalformedPolicy::Skip,
        }
    }
}

// ==========================================
// 邮件配置
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    /// 587 端口常用
    #[default]
    StartTls,
    /// 465 端口常用 (隐式 TLS)
    Tls,
    /// 明文 (25 端口内网中继)
    None,
}

pub const DEFAULT_EMAIL_SUBJECT: &str =
    "Cyber Controller - Protected Objects Flow Detector Report";

pub const DEFAULT_EMAIL_BODY_TEMPLATE: &str = "Hello,

Please find attached the Protected Objects Flow Detector Thresholds Report generated on {date_time}.

Report Summary:
- Total Protected Objects: {total_objects}
- Objects With Threshold Violations: {violating_objects}
- Report Period: Last {days_lookback} days
- Threshold Violations Highlighted: {threshold_percentage}% of maximum values

The report includes:
- Current activation thresholds for TCP, UDP, ICMP, and Total traffic
- Maximum observed values for the last {days_lookback} days
- Highlighted rows indicate thresholds below {threshold_percentage}% of observed maximums

Best regards,
Cyber Controller Report System
";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub enabled: bool,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub security: SmtpSecurity,
    /// 用户名/密码均为空时匿名发送
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub subject: String,
    pub body_template: String,
    pub timeout_secs: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_server: String::new(),
            smtp_port: 587,
            security: SmtpSecurity::StartTls,
            username: None,
            password: None,
            from: String::new(),
            to: Vec::new(),
            cc: Vec::new(),
            subject: DEFAULT_EMAIL_SUBJECT.to_string(),
            body_template: DEFAULT_EMAIL_BODY_TEMPLATE.to_string(),
            timeout_secs: 30,
        }
    }
}

// ==========================================
// ReportConfig - 顶层配置
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub controller: ControllerConfig,
    pub report: ReportSettings,
    pub email: EmailConfig,
}

impl ReportConfig {
    /// 默认配置路径: <config_dir>/po-threshold-report/config.json
    pub fn default_path() -> ConfigResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or(ConfigError::NoDefaultPath)
    }

    /// 完整加载流程: 读文件 → 环境变量覆写 → 校验
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// 凭据覆写; lookup 便于测试注入
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = non_empty(env_keys::CC_USERNAME) {
            self.controller.username = v;
        }
        if let Some(v) = non_empty(env_keys::CC_PASSWORD) {
            self.controller.password = v;
        }
        if let Some(v) = non_empty(env_keys::SMTP_USERNAME) {
            self.email.username = Some(v);
        }
        if let Some(v) = non_empty(env_keys::SMTP_PASSWORD) {
            self.email.password = Some(v);
        }
    }

    /// 校验; 阈值比例错误以 InvalidFraction 报出
    pub fn validate(&self) -> ConfigResult<()> {
        self.threshold_fraction()?;

        if self.controller.primary_url.trim().is_empty() {
            return Err(ConfigError::value(
                "controller.primary_url",
                "",
                "主控制器地址不能为空",
            ));
        }
        if self.controller.max_concurrency == 0 {
            return Err(ConfigError::value(
                "controller.max_concurrency",
                0,
                "并发数至少为 1",
            ));
        }
        if self.controller.request_timeout_secs == 0 {
            return Err(ConfigError::value(
                "controller.request_timeout_secs",
                0,
                "请求超时必须大于 0",
            ));
        }
        if self.report.lookback_days == 0 {
            return Err(ConfigError::value(
                "report.lookback_days",
                0,
                "回看天数至少为 1",
            ));
        }
        if self.report.lookback_days > MAX_LOOKBACK_DAYS {
            return Err(ConfigError::value(
                "report.lookback_days",
                self.report.lookback_days,
                format!("回看天数不能超过 {}", MAX_LOOKBACK_DAYS),
            ));
        }
        if self.report.output_filename_template.trim().is_empty() {
            return Err(ConfigError::value(
                "report.output_filename_template",
                "",
                "输出文件名模板不能为空",
            ));
        }
        if self.email.enabled {
            if self.email.smtp_server.trim().is_empty() {
                return Err(ConfigError::value("email.smtp_server", "", "启用邮件时必须配置 SMTP 服务器"));
            }
            if self.email.from.trim().is_empty() {
                return Err(ConfigError::value("email.from", "", "启用邮件时必须配置发件人"));
            }
            if self.email.to.is_empty() {
                return Err(ConfigError::value("email.to", "[]", "启用邮件时至少需要一个收件人"));
            }
        }
        Ok(())
    }

    pub fn threshold_fraction(&self) -> ConfigResult<ThresholdFraction> {
        Ok(ThresholdFraction::new(self.report.threshold_fraction)?)
    }

    /// 生成输出文件名: 替换 {timestamp}, 缺扩展名时补上
    pub fn output_filename<Tz>(&self, now: &DateTime<Tz>, extension: &str) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let stamp = now.format(TIMESTAMP_FORMAT).to_string();
        let name = self
            .report
            .output_filename_template
            .trim()
            .replace(TIMESTAMP_PLACEHOLDER, &stamp);

        let suffix = format!(".{}", extension);
        if name.to_lowercase().ends_with(&suffix) {
            name
        } else {
            format!("{}{}", name, suffix)
        }
    }

    /// 输出文件完整路径
    pub fn output_path<Tz>(&self, now: &DateTime<Tz>, extension: &str) -> PathBuf
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        self.report.output_dir.join(self.output_filename(now, extension))
    }
}
