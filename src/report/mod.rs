// ==========================================
// 防护对象阈值报表 - 报表层
// ==========================================
// 职责: 构建报表布局 (纯数据) + 渲染为文件内容
// 高亮判定在 builder, 视觉映射在 style / 渲染器
// ==========================================

pub mod builder;
pub mod csv_renderer;
pub mod error;
pub mod renderer;
pub mod style;
pub mod xlsx_renderer;

pub use builder::{
    CellValue, Column, ColumnKind, ReportArtifact, ReportBuilder, ReportRow, Section, SectionSpan,
};
pub use csv_renderer::CsvRenderer;
pub use error::{RenderError, RenderResult};
pub use renderer::{ArtifactRenderer, ReportFormat};
pub use style::HighlightScheme;
pub use xlsx_renderer::XlsxRenderer;
