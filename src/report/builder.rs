// ==========================================
// 防护对象阈值报表 - 报表构建器
// ==========================================
// 输入: 按顺序排列的已评估 ObjectReport
// 输出: ReportArtifact (列布局 + 分区 + 行高亮元数据)
// 列顺序固定:
//   Name
//   Current Thresholds: TCP/UDP/ICMP/Total × (Activation Mbps, Activation PPS)
//   Max value:          TCP/UDP/ICMP/Total × (Max Mbps, Max PPS)
// 列宽 = 表头与所有单元格文本的最大字符宽度
//   数值单元格按完整数值计宽 (工作簿里写的是原值, 不是两位小数)
// ==========================================

use crate::domain::report::ObjectReport;
use crate::domain::types::MetricKey;
use serde::Serialize;

pub const NAME_HEADER: &str = "Name";
pub const THRESHOLDS_SECTION_TITLE: &str = "Current Thresholds";

// ==========================================
// 列 / 分区 定义
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Section {
    CurrentThresholds,
    ObservedMaxima,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnKind {
    Name,
    Activation(MetricKey),
    Max(MetricKey),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub kind: ColumnKind,
    pub header: String,
    pub section: Option<Section>,
    /// 内容宽度 (字符数), 渲染层自行加边距
    pub content_width: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionSpan {
    pub section: Section,
    pub title: String,
    pub first_col: usize,
    pub last_col: usize,
}

// ==========================================
// 单元格 / 行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

impl CellValue {
    /// 显示文本: 整数不带小数, 其余最多两位小数
    pub fn display(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(v) => format_number(*v),
        }
    }

    /// 计宽文本: 数值取完整表示与显示文本中较宽者
    pub fn width_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(v) => {
                let full = v.to_string();
                let shown = format_number(*v);
                if text_width(&full) >= text_width(&shown) {
                    full
                } else {
                    shown
                }
            }
        }
    }
}

pub fn format_number(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{:.0}", v)
    } else {
        let s = format!("{:.2}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub name: String,
    /// 与 columns 一一对应 (含名称列)
    pub cells: Vec<CellValue>,
    pub highlighted: bool,
    pub violating: Vec<MetricKey>,
}

// ==========================================
// ReportArtifact
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportArtifact {
    pub columns: Vec<Column>,
    pub sections: Vec<SectionSpan>,
    pub rows: Vec<ReportRow>,
}

impl ReportArtifact {
    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.header.as_str()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn highlighted_count(&self) -> usize {
        self.rows.iter().filter(|r| r.highlighted).count()
    }
}

// ==========================================
// ReportBuilder
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct ReportBuilder {
    lookback_days: u32,
}

impl ReportBuilder {
    pub fn new(lookback_days: u32) -> Self {
        Self { lookback_days }
    }

    /// 最大值分区标题
    pub fn maxima_section_title(&self) -> String {
        format!("Max value for last {} days", self.lookback_days)
    }

    /// 固定列布局 (宽度暂为表头宽度)
    pub fn columns(&self) -> Vec<Column> {
        let mut columns = vec![Column {
            kind: ColumnKind::Name,
            header: NAME_HEADER.to_string(),
            section: None,
            content_width: 0,
        }];

        for key in MetricKey::all() {
            columns.push(Column {
                kind: ColumnKind::Activation(key),
                header: format!("{} Activation {}", key.protocol.label(), key.measure.label()),
                section: Some(Section::CurrentThresholds),
                content_width: 0,
            });
        }
        for key in MetricKey::all() {
            columns.push(Column {
                kind: ColumnKind::Max(key),
                header: format!("{} Max {}", key.protocol.label(), key.measure.label()),
                section: Some(Section::ObservedMaxima),
                content_width: 0,
            });
        }

        for column in columns.iter_mut() {
            column.content_width = text_width(&column.header);
        }
        columns
    }

    /// 构建报表; 空输入得到仅含表头的报表
    pub fn build(&self, reports: &[ObjectReport]) -> ReportArtifact {
        let mut columns = self.columns();
        let sections = section_spans(&columns, self.maxima_section_title());

        let rows: Vec<ReportRow> = reports.iter().map(|r| build_row(&columns, r)).collect();

        for row in &rows {
            for (column, cell) in columns.iter_mut().zip(row.cells.iter()) {
                column.content_width = column.content_width.max(text_width(&cell.width_text()));
            }
        }

        ReportArtifact {
            columns,
            sections,
            rows,
        }
    }
}

fn build_row(columns: &[Column], report: &ObjectReport) -> ReportRow {
    let metrics = report.metrics();
    let cells = columns
        .iter()
        .map(|column| match column.kind {
            ColumnKind::Name => CellValue::Text(report.name().to_string()),
            ColumnKind::Activation(key) => {
                CellValue::Number(metrics.get(key.protocol).activation(key.measure))
            }
            ColumnKind::Max(key) => CellValue::Number(metrics.get(key.protocol).max(key.measure)),
        })
        .collect();

    ReportRow {
        name: report.name().to_string(),
        cells,
        highlighted: report.is_violating(),
        violating: report.violating_metrics().collect(),
    }
}

fn section_spans(columns: &[Column], maxima_title: String) -> Vec<SectionSpan> {
    let span = |section: Section, title: String| {
        let positions: Vec<usize> = columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.section == Some(section))
            .map(|(i, _)| i)
            .collect();
        SectionSpan {
            section,
            title,
            first_col: positions.first().copied().unwrap_or(0),
            last_col: positions.last().copied().unwrap_or(0),
        }
    };

    vec![
        span(Section::CurrentThresholds, THRESHOLDS_SECTION_TITLE.to_string()),
        span(Section::ObservedMaxima, maxima_title),
    ]
}

fn text_width(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::raw::{RawMaxima, RawSample, RawThresholds, RawTrafficSeries};
    use crate::domain::types::{Measure, Protocol};
    use crate::engine::{RecordNormalizer, ViolationEvaluator};
    use serde_json::json;

    fn evaluated(name: &str, tcp_activation: f64, tcp_max_pps: f64) -> ObjectReport {
        let mut raw = RawThresholds::default();
        raw.set(Protocol::Tcp, Measure::Pps, json!(tcp_activation));
        let series = RawTrafficSeries {
            bps: vec![],
            pps: vec![RawSample::new(json!(tcp_max_pps))],
        };
        let report = RecordNormalizer::new()
            .normalize(name, &raw.into(), &RawMaxima::new().with(Protocol::Tcp, series))
            .unwrap();
        ViolationEvaluator::default().evaluate(report)
    }

    #[test]
    fn test_header_order() {
        let artifact = ReportBuilder::new(7).build(&[]);
        assert_eq!(
            artifact.headers(),
            vec![
                "Name",
                "TCP Activation Mbps",
                "TCP Activation PPS",
                "UDP Activation Mbps",
                "UDP Activation PPS",
                "ICMP Activation Mbps",
                "ICMP Activation PPS",
                "Total Activation Mbps",
                "Total Activation PPS",
                "TCP Max Mbps",
                "TCP Max PPS",
                "UDP Max Mbps",
                "UDP Max PPS",
                "ICMP Max Mbps",
                "ICMP Max PPS",
                "Total Max Mbps",
                "Total Max PPS",
            ]
        );
    }

    #[test]
    fn test_empty_input_is_header_only() {
        let artifact = ReportBuilder::new(7).build(&[]);
        assert_eq!(artifact.row_count(), 0);
        assert_eq!(artifact.columns.len(), 17);
        assert_eq!(artifact.columns[0].content_width, 4);
    }

    #[test]
    fn test_section_spans() {
        let artifact = ReportBuilder::new(14).build(&[]);
        assert_eq!(artifact.sections.len(), 2);
        assert_eq!(artifact.sections[0].title, "Current Thresholds");
        assert_eq!((artifact.sections[0].first_col, artifact.sections[0].last_col), (1, 8));
        assert_eq!(artifact.sections[1].title, "Max value for last 14 days");
        assert_eq!((artifact.sections[1].first_col, artifact.sections[1].last_col), (9, 16));
    }

    #[test]
    fn test_row_highlight_and_order() {
        let reports = vec![
            evaluated("a-compliant", 1000.0, 10.0),
            evaluated("b-violating", 10.0, 1000.0),
        ];
        let artifact = ReportBuilder::new(7).build(&reports);

        assert_eq!(artifact.rows[0].name, "a-compliant");
        assert!(!artifact.rows[0].highlighted);
        assert_eq!(artifact.rows[1].name, "b-violating");
        assert!(artifact.rows[1].highlighted);
        assert_eq!(
            artifact.rows[1].violating,
            vec![MetricKey::new(Protocol::Tcp, Measure::Pps)]
        );
        assert_eq!(artifact.highlighted_count(), 1);
        // TCP Activation PPS 列
        assert_eq!(artifact.rows[1].cells[2], CellValue::Number(10.0));
        // TCP Max PPS 列
        assert_eq!(artifact.rows[1].cells[10], CellValue::Number(1000.0));
    }

    #[test]
    fn test_column_width_follows_content() {
        let long_name = "very-long-protected-object-name";
        let artifact = ReportBuilder::new(7).build(&[evaluated(long_name, 1.0, 1.0)]);
        assert_eq!(artifact.columns[0].content_width, long_name.len());
        // 表头比数值更宽
        assert_eq!(artifact.columns[1].content_width, "TCP Activation Mbps".len());
    }

    #[test]
    fn test_numeric_width_uses_full_value() {
        assert_eq!(CellValue::Number(12.345678).display(), "12.35");
        assert_eq!(CellValue::Number(12.345678).width_text(), "12.345678");
        assert_eq!(CellValue::Number(80.0).width_text(), "80");

        // 显示为 "0", 工作簿中为完整小数, 且比表头更宽
        let tiny = 0.000123456789012345;
        let artifact = ReportBuilder::new(7).build(&[evaluated("x", tiny, 1.0)]);
        assert_eq!(artifact.rows[0].cells[2], CellValue::Number(tiny));
        assert_eq!(artifact.rows[0].cells[2].display(), "0");
        assert_eq!(artifact.columns[2].content_width, tiny.to_string().len());
        assert!(artifact.columns[2].content_width > "TCP Activation PPS".len());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(80.0), "80");
        assert_eq!(format_number(12.5), "12.5");
        assert_eq!(format_number(2.345678), "2.35");
        assert_eq!(format_number(3.10), "3.1");
    }
}
