// ==========================================
// 发票催收汇总系统 - 核心库
// ==========================================
// 输入: 发票明细（Excel / `;` 分隔文本）
// 输出: 每个 fiscalId 一行的宽表
// 系统定位: 批处理工具, 单次运行无持久状态
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 表格、发票与报告
pub mod domain;

// 引擎层 - 规范化、过滤、分组、宽表
pub mod engine;

// 导入层 - 文件解析与映射
pub mod importer;

// 导出层 - 宽表写出
pub mod exporter;

// 配置层 - 流水线配置
pub mod config;

// 日志系统
pub mod logging;

// 命令行
pub mod cli;
pub mod commands;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    CellValue, CustomerSummary, InvoiceLine, InvoiceRow, Notice, NoticeKind, RunReport, Table,
};

// 引擎
pub use engine::{
    DateFormatter, DateWindow, Pipeline, PipelineOutput, RowGrouper, TextNormalizer,
    WideTableBuilder,
};

// 导入/导出/配置
pub use config::{ConfigManager, PipelineConfig};
pub use exporter::CsvExporter;
pub use importer::{ImportError, UniversalFileParser};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "发票催收汇总系统";
