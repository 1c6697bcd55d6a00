// ==========================================
// 发票催收汇总系统 - 导入层
// ==========================================
// 职责: 外部文件 → 内存表 → 清洗 → InvoiceRow
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod importer_trait;

// 重导出核心类型
pub use data_cleaner::{CleaningOutcome, DataCleaner as DataCleanerImpl};
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper as FieldMapperImpl;
pub use file_parser::{CsvParser, ExcelParser, ParsedFile, UniversalFileParser};

// 重导出 Trait 接口
pub use importer_trait::{DataCleaner, FieldMapper, FileParser};
