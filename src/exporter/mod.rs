// ==========================================
// 发票催收汇总系统 - 导出层
// ==========================================
// 职责: 宽表写出为分隔符文本
// ==========================================

pub mod csv_exporter;
pub mod error;

pub use csv_exporter::CsvExporter;
pub use error::{ExportError, ExportResult};
