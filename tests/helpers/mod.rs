// ==========================================
// 集成测试辅助模块
// ==========================================

pub mod dataset_builder;

#[allow(unused_imports)]
pub use dataset_builder::{fixture, DatasetBuilder, InvoiceBuilder, STANDARD_COLUMNS};
