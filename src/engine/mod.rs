// ==========================================
// 发票催收汇总系统 - 引擎层
// ==========================================
// 职责: 文本规范化 / 行过滤 / 日期格式化 / 按客户分组 / 宽表构建
// 红线: 引擎不读写文件, 所有非致命状况输出为 Notice
// ==========================================

pub mod date_formatter;
pub mod orchestrator;
pub mod row_filter;
pub mod row_grouper;
pub mod text_normalizer;
pub mod wide_table;

// 重导出核心引擎
pub use date_formatter::{parse_day_first, DateFormatter, DEFAULT_DATE_COLUMNS, DISPLAY_FORMAT};
pub use orchestrator::{Pipeline, PipelineOutput};
pub use row_filter::{DateWindow, DebtStateFilter, ReturnDateFilter, RowFilter};
pub use row_grouper::{GroupOutcome, RowGrouper};
pub use text_normalizer::{Normalized, RepairOutcome, RepairStatus, TextNormalizer};
pub use wide_table::{WideLayout, WideTableBuilder};
