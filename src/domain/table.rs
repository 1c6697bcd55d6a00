// ==========================================
// 发票催收汇总系统 - 表格领域模型
// ==========================================
// 职责: 单元格值 + 有序列名的内存表
// 用途: 导入层产出, 引擎层逐阶段变换, 导出层消费
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 日期时间单元格的渲染格式
pub const DATETIME_RENDER_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// CellValue - 单元格值
// ==========================================
// Empty 即缺失值（null），全链路统一使用
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// 缺失值判定（仅 Empty；空字符串文本不算缺失）
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// 缺失或空白文本
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// 渲染为文本（用于分组键、去重键与导出）
    ///
    /// - Empty → ""
    /// - Number → Rust 最短往返表示（整数不带小数部分）
    /// - DateTime → `%Y-%m-%d %H:%M:%S`
    pub fn render(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::DateTime(dt) => dt.format(DATETIME_RENDER_FORMAT).to_string(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<Option<String>> for CellValue {
    fn from(value: Option<String>) -> Self {
        value.map(CellValue::Text).unwrap_or_default()
    }
}

// ==========================================
// Table - 内存表
// ==========================================
// 红线: 每行长度恒等于列数（push 时补齐/截断）
// 列名区分大小写, 精确匹配
// 每行带源行号（表头为第 1 行）, 过滤后不变, 所有 Notice 行号都取自这里
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
    #[serde(default)]
    source_lines: Vec<usize>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            source_lines: Vec::new(),
        }
    }

    /// 以列名与行数据构造表（行长度自动对齐到列数）
    pub fn with_rows(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Vec<CellValue>] {
        &mut self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<CellValue>> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// 追加一行, 源行号顺延（首行为第 2 行）
    pub fn push_row(&mut self, row: Vec<CellValue>) {
        let line = self.source_lines.last().map_or(2, |last| last + 1);
        self.push_row_at(row, line);
    }

    /// 追加一行并指定源行号（文件解析器使用）
    pub fn push_row_at(&mut self, mut row: Vec<CellValue>, source_line: usize) {
        row.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(row);
        self.source_lines.push(source_line);
    }

    /// 第 idx 行（0 基）在源文件中的行号
    pub fn source_line(&self, idx: usize) -> Option<usize> {
        self.source_lines.get(idx).copied()
    }

    /// 读取单元格；列不存在或行越界时返回 None
    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// 按列名迭代整列
    pub fn column_values<'a>(
        &'a self,
        column: &str,
    ) -> Option<impl Iterator<Item = &'a CellValue> + 'a> {
        let col = self.column_index(column)?;
        Some(self.rows.iter().map(move |r| &r[col]))
    }

    /// 按谓词保留行（保持原有相对顺序）
    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&[CellValue]) -> bool,
    {
        let mut lines = std::mem::take(&mut self.source_lines).into_iter();
        let mut kept_lines = Vec::with_capacity(self.rows.len());
        self.rows.retain(|row| {
            let line = lines.next();
            let keep_row = keep(row);
            if keep_row {
                kept_lines.extend(line);
            }
            keep_row
        });
        self.source_lines = kept_lines;
    }
}
