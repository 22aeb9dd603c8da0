// ==========================================
// 防护对象阈值报表 - CSV 渲染器
// ==========================================
// 无样式输出: 分区行 + 表头行 + 数据行
// 末尾追加 Violations 列, 列出违规指标 (tcp/mbps;udp/pps)
// ==========================================

use crate::report::builder::ReportArtifact;
use crate::report::error::{RenderError, RenderResult};
use crate::report::renderer::ArtifactRenderer;
use csv::WriterBuilder;

pub const VIOLATIONS_HEADER: &str = "Violations";

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRenderer;

impl CsvRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl ArtifactRenderer for CsvRenderer {
    fn render(&self, artifact: &ReportArtifact) -> RenderResult<Vec<u8>> {
        let width = artifact.columns.len() + 1;
        let mut writer = WriterBuilder::new().flexible(false).from_writer(Vec::new());

        // 分区行: 标题放在分区首列
        let mut section_row = vec![String::new(); width];
        for span in &artifact.sections {
            if let Some(slot) = section_row.get_mut(span.first_col) {
                *slot = span.title.clone();
            }
        }
        writer.write_record(&section_row)?;

        let mut header: Vec<&str> = artifact.headers();
        header.push(VIOLATIONS_HEADER);
        writer.write_record(&header)?;

        for row in &artifact.rows {
            let mut record: Vec<String> = row.cells.iter().map(|c| c.display()).collect();
            let violations: Vec<String> = row.violating.iter().map(|k| k.to_string()).collect();
            record.push(violations.join(";"));
            writer.write_record(&record)?;
        }

        writer
            .into_inner()
            .map_err(|e| RenderError::Csv(csv::Error::from(e.into_error())))
    }

    fn extension(&self) -> &'static str {
        "csv"
    }

    fn content_type(&self) -> &'static str {
        "text/csv"
    }
}
