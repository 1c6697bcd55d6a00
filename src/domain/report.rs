// ==========================================
// 发票催收汇总系统 - 运行报告
// ==========================================
// 职责: 记录流水线中的非致命状况（Notice）与计数
// 红线: 核心层任何状况都不中断流水线, 只记录并降级为默认值
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// NoticeKind - 状况类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoticeKind {
    MissingKeyColumn,      // 缺少 fiscalId 列 → 空结果
    MissingKeyValue,       // 行内 fiscalId 为空 → 该行不参与分组
    EncodingRepairFailed,  // 双向修复均失败 → 保留原文
    NumericCoercionFailed, // totalPendiente 非数值 → 0
    DateParseFailed,       // 日期无法解析 → 空
    MalformedRowSkipped,   // 文本行字段数超过表头 → 加载时跳过
}

// ==========================================
// NoticeLevel - 状况级别
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Warning, // 影响结果形状（缺列、丢行）
    Info,    // 已就地恢复
}

impl NoticeKind {
    pub fn level(self) -> NoticeLevel {
        match self {
            NoticeKind::MissingKeyColumn
            | NoticeKind::MissingKeyValue
            | NoticeKind::MalformedRowSkipped => NoticeLevel::Warning,
            NoticeKind::EncodingRepairFailed
            | NoticeKind::NumericCoercionFailed
            | NoticeKind::DateParseFailed => NoticeLevel::Info,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    /// 源文件行号（表头为第 1 行）; 过滤不改变行号
    pub row_number: Option<usize>,
    pub column: Option<String>,
    pub message: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            row_number: None,
            column: None,
            message: message.into(),
        }
    }

    pub fn at_row(mut self, row_number: usize) -> Self {
        self.row_number = Some(row_number);
        self
    }

    pub fn in_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn level(&self) -> NoticeLevel {
        self.kind.level()
    }
}

// ==========================================
// RunReport - 单次运行报告
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,

    // ===== 行数统计 =====
    pub input_rows: usize,
    pub filtered_rows: usize,
    pub grouped_rows: usize,
    pub customers: usize,

    // ===== 清洗统计 =====
    pub repaired_cells: usize,
    pub unrepairable_cells: usize,

    // ===== 状况明细 =====
    pub notices: Vec<Notice>,
}

impl RunReport {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            ..Self::default()
        }
    }

    pub fn record(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    pub fn extend(&mut self, notices: impl IntoIterator<Item = Notice>) {
        self.notices.extend(notices);
    }

    pub fn count(&self, kind: NoticeKind) -> usize {
        self.notices.iter().filter(|n| n.kind == kind).count()
    }

    pub fn has(&self, kind: NoticeKind) -> bool {
        self.notices.iter().any(|n| n.kind == kind)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Notice> {
        self.notices
            .iter()
            .filter(|n| n.level() == NoticeLevel::Warning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts_by_kind() {
        let mut report = RunReport::new("run-1");
        report.record(Notice::new(NoticeKind::NumericCoercionFailed, "x").at_row(1));
        report.record(Notice::new(NoticeKind::NumericCoercionFailed, "y").at_row(3));
        report.record(Notice::new(NoticeKind::MissingKeyColumn, "z"));

        assert_eq!(report.count(NoticeKind::NumericCoercionFailed), 2);
        assert!(report.has(NoticeKind::MissingKeyColumn));
        assert!(!report.has(NoticeKind::DateParseFailed));
        assert_eq!(report.warnings().count(), 1);
    }
}
