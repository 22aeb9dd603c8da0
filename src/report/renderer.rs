// ==========================================
// 防护对象阈值报表 - 渲染器 Trait
// ==========================================
// ReportArtifact → 字节流; 写文件 / 投递由调用方负责
// ==========================================

use crate::report::builder::ReportArtifact;
use crate::report::csv_renderer::CsvRenderer;
use crate::report::error::RenderResult;
use crate::report::style::HighlightScheme;
use crate::report::xlsx_renderer::XlsxRenderer;
use serde::{Deserialize, Serialize};
use std::fmt;

pub trait ArtifactRenderer: Send + Sync {
    /// 渲染为完整文件内容
    fn render(&self, artifact: &ReportArtifact) -> RenderResult<Vec<u8>>;

    /// 文件扩展名 (不含点)
    fn extension(&self) -> &'static str;

    /// 附件 MIME 类型
    fn content_type(&self) -> &'static str;
}

// ==========================================
// 输出格式
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ReportFormat {
    pub fn renderer(self, scheme: HighlightScheme) -> Box<dyn ArtifactRenderer> {
        match self {
            ReportFormat::Xlsx => Box::new(XlsxRenderer::new(scheme)),
            ReportFormat::Csv => Box::new(CsvRenderer::new()),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Xlsx => write!(f, "xlsx"),
            ReportFormat::Csv => write!(f, "csv"),
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "xlsx" => Ok(ReportFormat::Xlsx),
            "csv" => Ok(ReportFormat::Csv),
            other => Err(format!("不支持的报表格式: {}（仅支持 xlsx/csv）", other)),
        }
    }
}
