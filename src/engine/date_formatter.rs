// ==========================================
// 发票催收汇总系统 - 日期格式化器
// ==========================================
// 职责: 日期列按“日在前”解析, 统一渲染为 DD/MM/YYYY
// 红线: 解析失败 → 空值（不报错, 空白单元格本就常见）
// 注意: 输出仅用于展示, 不保证按通用规则可再解析
// ==========================================

use crate::domain::report::{Notice, NoticeKind};
use crate::domain::table::{CellValue, Table};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use tracing::debug;

/// 展示格式
pub const DISPLAY_FORMAT: &str = "%d/%m/%Y";

/// 默认日期列
pub const DEFAULT_DATE_COLUMNS: [&str; 5] = [
    "fechaDevolucion",
    "fechaEmisionFactura",
    "fecha_pago",
    "fechaInicioFactura",
    "fechaFinFactura",
];

// 日在前的日期部分（四位年优先, 两位年兜底）
const DAY_FIRST_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%d/%m/%y", "%d-%m-%y"];

// 可选的时间部分
const TIME_SUFFIXES: &[&str] = &[" %H:%M:%S", " %H:%M"];

// 年在前的格式无歧义, 不适用日在前规则
const YEAR_FIRST_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];
const YEAR_FIRST_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

// ==========================================
// DateFormatter
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct DateFormatter;

impl DateFormatter {
    pub fn new() -> Self {
        Self
    }

    /// 格式化表中所有指定的日期列（不存在的列忽略）
    ///
    /// # 返回
    /// - 格式化后的表
    /// - DateParseFailed 状况（仅针对非空且无法解析的值）
    pub fn format_dates(&self, mut table: Table, columns: &[String]) -> (Table, Vec<Notice>) {
        let mut notices = Vec::new();

        for column in columns {
            let Some(col) = table.column_index(column) else {
                continue;
            };

            let mut formatted = 0usize;
            let lines: Vec<Option<usize>> =
                (0..table.len()).map(|idx| table.source_line(idx)).collect();
            for (row, line) in table.rows_mut().iter_mut().zip(lines) {
                let cell = std::mem::take(&mut row[col]);
                let was_blank = cell.is_blank();
                row[col] = match self.parse_cell(&cell) {
                    Some(date) => {
                        formatted += 1;
                        CellValue::Text(date.format(DISPLAY_FORMAT).to_string())
                    }
                    None => {
                        if !was_blank {
                            let mut notice = Notice::new(
                                NoticeKind::DateParseFailed,
                                format!("无法解析为日期: {}", cell),
                            )
                            .in_column(column.clone());
                            notice.row_number = line;
                            notices.push(notice);
                        }
                        CellValue::Empty
                    }
                };
            }
            debug!(column = %column, formatted = formatted, "日期列格式化完成");
        }

        (table, notices)
    }

    /// 解析单元格为日期
    pub fn parse_cell(&self, cell: &CellValue) -> Option<NaiveDate> {
        match cell {
            CellValue::DateTime(dt) => Some(dt.date()),
            CellValue::Text(s) => parse_day_first(s),
            CellValue::Empty | CellValue::Number(_) | CellValue::Bool(_) => None,
        }
    }
}

/// 按“日在前”规则解析日期文本
pub fn parse_day_first(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    for format in DAY_FIRST_FORMATS {
        if let Some(date) = parse_with_optional_time(value, format) {
            // %Y 会把两位年 "24" 读成公元 24 年, 交给 %y 处理
            if format.contains("%Y") && date.year() < 1000 {
                continue;
            }
            return Some(date);
        }
    }

    YEAR_FIRST_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .or_else(|| {
            YEAR_FIRST_DATETIME_FORMATS.iter().find_map(|format| {
                NaiveDateTime::parse_from_str(value, format)
                    .ok()
                    .map(|dt| dt.date())
            })
        })
}

fn parse_with_optional_time(value: &str, date_format: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(value, date_format) {
        return Some(date);
    }
    TIME_SUFFIXES.iter().find_map(|suffix| {
        let format = format!("{}{}", date_format, suffix);
        NaiveDateTime::parse_from_str(value, &format)
            .ok()
            .map(|dt| dt.date())
    })
}
