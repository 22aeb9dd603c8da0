// ==========================================
// 防护对象阈值报表 - 渲染层错误类型
// ==========================================

use thiserror::Error;

/// 报表渲染 / 写出错误
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Excel 生成失败: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV 生成失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("报表布局无效: {0}")]
    Layout(String),

    #[error("报表写入失败 ({path}): {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result 类型别名
pub type RenderResult<T> = Result<T, RenderError>;
