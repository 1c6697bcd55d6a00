// ==========================================
// 发票催收汇总系统 - 数据清洗器实现
// ==========================================
// 职责: 对表内每个文本单元格执行 TextNormalizer
// 统计: 修复数 / 无法修复数（后者同时记录 EncodingRepairFailed 状况）
// ==========================================

use crate::domain::report::{Notice, NoticeKind};
use crate::domain::table::Table;
use crate::engine::text_normalizer::{RepairStatus, TextNormalizer};
use crate::importer::importer_trait::DataCleaner as DataCleanerTrait;
use tracing::debug;

/// 整表清洗结果
#[derive(Debug, Clone, Default)]
pub struct CleaningOutcome {
    pub table: Table,
    pub repaired: usize,
    pub unrepairable: usize,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone, Default)]
pub struct DataCleaner {
    normalizer: TextNormalizer,
}

impl DataCleaner {
    pub fn new(normalizer: TextNormalizer) -> Self {
        Self { normalizer }
    }

    pub fn with_max_passes(max_passes: usize) -> Self {
        Self::new(TextNormalizer::new(max_passes))
    }
}

impl DataCleanerTrait for DataCleaner {
    fn clean_text(&self, value: &str) -> (String, RepairStatus) {
        let normalized = self.normalizer.normalize_detailed(value);
        (normalized.text, normalized.status)
    }

    fn clean_table(&self, mut table: Table) -> CleaningOutcome {
        let columns: Vec<String> = table.columns().to_vec();
        let mut repaired = 0usize;
        let mut unrepairable = 0usize;
        let mut notices = Vec::new();

        let lines: Vec<Option<usize>> =
            (0..table.len()).map(|idx| table.source_line(idx)).collect();
        for (row, line) in table.rows_mut().iter_mut().zip(lines) {
            for (col, cell) in row.iter_mut().enumerate() {
                let (cleaned, status) = self.clean_cell(std::mem::take(cell));
                match status {
                    RepairStatus::Repaired => repaired += 1,
                    RepairStatus::Unrepairable => {
                        unrepairable += 1;
                        let mut notice = Notice::new(
                            NoticeKind::EncodingRepairFailed,
                            format!("疑似乱码但无法修复, 保留原文: {}", cleaned),
                        )
                        .in_column(columns[col].clone());
                        notice.row_number = line;
                        notices.push(notice);
                    }
                    RepairStatus::Clean => {}
                }
                *cell = cleaned;
            }
        }

        debug!(
            rows = table.len(),
            repaired = repaired,
            unrepairable = unrepairable,
            "文本清洗完成"
        );

        CleaningOutcome {
            table,
            repaired,
            unrepairable,
            notices,
        }
    }
}
