// ==========================================
// 发票催收汇总系统 - 领域模型层
// ==========================================
// 职责: 定义表格/发票/客户汇总/运行报告
// 红线: 不含文件读写, 不含引擎逻辑
// ==========================================

pub mod invoice;
pub mod report;
pub mod table;

// 重导出核心类型
pub use invoice::{columns, total_facturas_label, CustomerSummary, InvoiceLine, InvoiceRow};
pub use report::{Notice, NoticeKind, NoticeLevel, RunReport};
pub use table::{CellValue, Table};
