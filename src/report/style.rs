// ==========================================
// 防护对象阈值报表 - 高亮配色方案
// ==========================================
// 将行级高亮判定映射为视觉属性, 与判定逻辑解耦
// 颜色均为 0xRRGGBB
// ==========================================

use crate::report::builder::Section;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightScheme {
    /// "Current Thresholds" 分区标题底色
    pub thresholds_band: u32,
    /// "Max value" 分区标题底色
    pub maxima_band: u32,
    pub band_font_size: u32,
    /// 表头底色 / 字色
    pub header_fill: u32,
    pub header_font: u32,
    /// 违规行底色
    pub violation_fill: u32,
    /// 列宽边距 (字符)
    pub column_padding: usize,
}

impl HighlightScheme {
    pub fn band_fill(&self, section: Section) -> u32 {
        match section {
            Section::CurrentThresholds => self.thresholds_band,
            Section::ObservedMaxima => self.maxima_band,
        }
    }
}

impl Default for HighlightScheme {
    fn default() -> Self {
        Self {
            thresholds_band: 0x92D050,
            maxima_band: 0xFFFF00,
            band_font_size: 14,
            header_fill: 0x4472C4,
            header_font: 0xFFFFFF,
            violation_fill: 0xFF0000,
            column_padding: 2,
        }
    }
}
