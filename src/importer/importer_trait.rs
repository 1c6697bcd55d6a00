// ==========================================
// 发票催收汇总系统 - 导入 Trait
// ==========================================
// 职责: 定义导入阶段接口（不包含实现）
// 阶段: 文件解析 → 文本清洗 → 字段映射
// ==========================================

use crate::domain::invoice::InvoiceRow;
use crate::domain::table::{CellValue, Table};
use crate::engine::text_normalizer::RepairStatus;
use crate::importer::data_cleaner::CleaningOutcome;
use crate::importer::error::ImportResult;
use crate::importer::file_parser::ParsedFile;
use std::path::Path;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析文件为内存表
    ///
    /// # 参数
    /// - file_path: 文件路径
    ///
    /// # 返回
    /// - Ok(ParsedFile): 表 + 被跳过的畸形行行号
    /// - Err: 文件不存在、格式不支持、读取失败
    fn parse_to_table(&self, file_path: &Path) -> ImportResult<ParsedFile>;
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 用途: 文本清洗接口
// 实现者: DataCleaner（TextNormalizer 驱动）
pub trait DataCleaner: Send + Sync {
    /// 清洗单段文本, 返回清洗结果与编码修复状态
    fn clean_text(&self, value: &str) -> (String, RepairStatus);

    /// 清洗单元格（仅 Text 受影响, 其余原样返回）
    fn clean_cell(&self, value: CellValue) -> (CellValue, RepairStatus) {
        match value {
            CellValue::Text(s) => {
                let (cleaned, status) = self.clean_text(&s);
                (CellValue::Text(cleaned), status)
            }
            other => (other, RepairStatus::Clean),
        }
    }

    /// 清洗整表（仅单元格, 列名不变）
    fn clean_table(&self, table: Table) -> CleaningOutcome;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 字段映射接口
// 实现者: FieldMapper
pub trait FieldMapper: Send + Sync {
    /// 将表映射为发票行
    ///
    /// # 返回
    /// - Ok(Vec<InvoiceRow>): 缺失的非键列映射为 Empty
    /// - Err(ImportError::MissingKeyColumn): 表中没有 fiscalId 列
    fn map_rows(&self, table: &Table) -> ImportResult<Vec<InvoiceRow>>;
}
