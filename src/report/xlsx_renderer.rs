// ==========================================
// 防护对象阈值报表 - Excel 渲染器
// ==========================================
// 布局:
//   第 0 行: 分区标题 (合并单元格, 分区底色, 加粗 14 号居中)
//   第 1 行: 列表头 (加粗白字, 蓝底)
//   第 2 行起: 数据行, 违规行整行红底
// 列宽 = 内容宽度 + 边距; 冻结表头与名称列
// ==========================================

use crate::report::builder::{CellValue, ReportArtifact};
use crate::report::error::{RenderError, RenderResult};
use crate::report::renderer::ArtifactRenderer;
use crate::report::style::HighlightScheme;
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet};

pub const SHEET_NAME: &str = "PO Thresholds";
pub const SECTION_ROW: u32 = 0;
pub const HEADER_ROW: u32 = 1;
pub const FIRST_DATA_ROW: u32 = 2;

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Clone, Default)]
pub struct XlsxRenderer {
    scheme: HighlightScheme,
}

impl XlsxRenderer {
    pub fn new(scheme: HighlightScheme) -> Self {
        Self { scheme }
    }

    fn write_section_bands(&self, sheet: &mut Worksheet, artifact: &ReportArtifact) -> RenderResult<()> {
        for span in &artifact.sections {
            let format = Format::new()
                .set_bold()
                .set_font_size(self.scheme.band_font_size)
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
                .set_background_color(Color::RGB(self.scheme.band_fill(span.section)));

            let first = col_num(span.first_col)?;
            let last = col_num(span.last_col)?;
            if first == last {
                sheet.write_string_with_format(SECTION_ROW, first, span.title.as_str(), &format)?;
            } else {
                sheet.merge_range(SECTION_ROW, first, SECTION_ROW, last, &span.title, &format)?;
            }
        }
        Ok(())
    }

    fn write_header_row(&self, sheet: &mut Worksheet, artifact: &ReportArtifact) -> RenderResult<()> {
        let format = Format::new()
            .set_bold()
            .set_font_color(Color::RGB(self.scheme.header_font))
            .set_background_color(Color::RGB(self.scheme.header_fill));

        for (idx, column) in artifact.columns.iter().enumerate() {
            sheet.write_string_with_format(HEADER_ROW, col_num(idx)?, column.header.as_str(), &format)?;
        }
        Ok(())
    }

    fn write_data_rows(&self, sheet: &mut Worksheet, artifact: &ReportArtifact) -> RenderResult<()> {
        let highlight = Format::new().set_background_color(Color::RGB(self.scheme.violation_fill));
        let plain = Format::new();

        for (offset, row) in artifact.rows.iter().enumerate() {
            let row_num = FIRST_DATA_ROW + u32::try_from(offset)
                .map_err(|_| RenderError::Layout(format!("数据行过多: {}", offset)))?;
            let format = if row.highlighted { &highlight } else { &plain };

            for (idx, cell) in row.cells.iter().enumerate() {
                let col = col_num(idx)?;
                match cell {
                    CellValue::Text(text) => {
                        sheet.write_string_with_format(row_num, col, text.as_str(), format)?;
                    }
                    CellValue::Number(value) => {
                        sheet.write_number_with_format(row_num, col, *value, format)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn apply_column_widths(&self, sheet: &mut Worksheet, artifact: &ReportArtifact) -> RenderResult<()> {
        for (idx, column) in artifact.columns.iter().enumerate() {
            let width = column.content_width + self.scheme.column_padding;
            sheet.set_column_width(col_num(idx)?, width as f64)?;
        }
        Ok(())
    }
}

impl ArtifactRenderer for XlsxRenderer {
    fn render(&self, artifact: &ReportArtifact) -> RenderResult<Vec<u8>> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;

        self.write_section_bands(sheet, artifact)?;
        self.write_header_row(sheet, artifact)?;
        self.write_data_rows(sheet, artifact)?;
        self.apply_column_widths(sheet, artifact)?;
        sheet.set_freeze_panes(FIRST_DATA_ROW, 1)?;

        Ok(workbook.save_to_buffer()?)
    }

    fn extension(&self) -> &'static str {
        "xlsx"
    }

    fn content_type(&self) -> &'static str {
        XLSX_CONTENT_TYPE
    }
}

fn col_num(idx: usize) -> RenderResult<u16> {
    u16::try_from(idx).map_err(|_| RenderError::Layout(format!("列号超出范围: {}", idx)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::builder::ReportBuilder;

    #[test]
    fn test_render_empty_artifact_produces_zip() {
        let artifact = ReportBuilder::new(7).build(&[]);
        let bytes = XlsxRenderer::default().render(&artifact).unwrap();
        // xlsx 为 zip 容器
        assert_eq!(&bytes[..2], b"PK");
    }
}
