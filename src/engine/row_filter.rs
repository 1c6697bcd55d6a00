// ==========================================
// 发票催收汇总系统 - 行过滤器
// ==========================================
// 职责: 在文本清洗之后、日期格式化之前筛选行
// 过滤器由流水线按给定顺序依次应用
// 红线: 缺列/空白名单 → 原表返回, 不报错
// ==========================================

use crate::domain::invoice::columns;
use crate::domain::table::Table;
use crate::engine::date_formatter::DateFormatter;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::info;

// ==========================================
// RowFilter Trait
// ==========================================
pub trait RowFilter: Send + Sync {
    /// 过滤器名称（日志用）
    fn name(&self) -> &str;

    /// 应用过滤（保持行的相对顺序）
    fn apply(&self, table: Table) -> Table;
}

// ==========================================
// DebtStateFilter - 按欠款状态白名单过滤
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct DebtStateFilter {
    allowed: Vec<String>,
}

impl DebtStateFilter {
    pub fn new(allowed: Vec<String>) -> Self {
        Self { allowed }
    }

    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }
}

impl RowFilter for DebtStateFilter {
    fn name(&self) -> &str {
        "debt_state"
    }

    fn apply(&self, mut table: Table) -> Table {
        if self.allowed.is_empty() {
            return table;
        }
        let Some(col) = table.column_index(columns::ESTADO_DEUDA) else {
            return table;
        };

        let allowed: HashSet<&str> = self.allowed.iter().map(String::as_str).collect();
        let before = table.len();
        table.retain_rows(|row| allowed.contains(row[col].render().as_str()));

        info!(
            filter = self.name(),
            before = before,
            after = table.len(),
            "行过滤完成"
        );
        table
    }
}

// ==========================================
// DateWindow - 回款日期窗口
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateWindow {
    #[serde(rename = "9-30")]
    Between9And30Days,
    #[serde(rename = "9-60")]
    Between9And60Days,
    #[serde(rename = "since")]
    Since(NaiveDate),
}

impl DateWindow {
    /// 判定日期是否落在窗口内
    ///
    /// 远端边界开区间, 近端边界闭区间: today-30 < date <= today-9
    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            DateWindow::Between9And30Days => within_days(date, today, 9, 30),
            DateWindow::Between9And60Days => within_days(date, today, 9, 60),
            DateWindow::Since(since) => date >= *since,
        }
    }
}

fn within_days(date: NaiveDate, today: NaiveDate, near: i64, far: i64) -> bool {
    date > today - Duration::days(far) && date <= today - Duration::days(near)
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateWindow::Between9And30Days => f.write_str("9-30"),
            DateWindow::Between9And60Days => f.write_str("9-60"),
            DateWindow::Since(date) => write!(f, "desde {}", date.format("%d/%m/%Y")),
        }
    }
}

impl FromStr for DateWindow {
    type Err = String;

    /// 接受 "9-30" / "9-60"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "9-30" => Ok(DateWindow::Between9And30Days),
            "9-60" => Ok(DateWindow::Between9And60Days),
            other => Err(format!("未知的日期窗口: {} (可选: 9-30, 9-60)", other)),
        }
    }
}

// ==========================================
// ReturnDateFilter - 按 fechaDevolucion 窗口过滤
// ==========================================
#[derive(Debug, Clone)]
pub struct ReturnDateFilter {
    window: DateWindow,
    today: NaiveDate,
}

impl ReturnDateFilter {
    pub fn new(window: DateWindow, today: NaiveDate) -> Self {
        Self { window, today }
    }

    /// 以本地当天日期为基准
    pub fn from_today(window: DateWindow) -> Self {
        Self::new(window, chrono::Local::now().date_naive())
    }

    pub fn window(&self) -> DateWindow {
        self.window
    }
}

impl RowFilter for ReturnDateFilter {
    fn name(&self) -> &str {
        "return_date"
    }

    fn apply(&self, mut table: Table) -> Table {
        let Some(col) = table.column_index(columns::FECHA_DEVOLUCION) else {
            return table;
        };

        let parser = DateFormatter::new();
        let before = table.len();
        // 无法解析的日期不落在任何窗口内
        table.retain_rows(|row| {
            parser
                .parse_cell(&row[col])
                .map(|date| self.window.contains(date, self.today))
                .unwrap_or(false)
        });

        info!(
            filter = self.name(),
            window = %self.window,
            today = %self.today,
            before = before,
            after = table.len(),
            "行过滤完成"
        );
        table
    }
}
