// ==========================================
// 发票催收汇总系统 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls/.xlsm/.ods, 第一个工作表) / 文本表 (.csv/.txt, `;` 分隔)
// 规则:
// - 首行为表头（去首尾空白, 去 BOM）
// - 完全空白的行跳过
// - 文本行字段数多于表头 → 畸形行, 跳过并记录行号
// - 文本行字段数少于表头 → 以 Empty 补齐
// - 非 UTF-8 的文本行按 Windows-1252 解码
// ==========================================

use crate::domain::table::{CellValue, Table};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::FileParser;
use calamine::{open_workbook_auto, Data, DataType, Reader};
use csv::{ByteRecord, ReaderBuilder};
use encoding_rs::WINDOWS_1252;
use std::path::Path;
use tracing::{debug, warn};

/// 默认文本表分隔符
pub const DEFAULT_CSV_DELIMITER: u8 = b';';

const EXCEL_EXTENSIONS: &[&str] = &["xlsx", "xls", "xlsm", "xlsb", "ods"];
const TEXT_EXTENSIONS: &[&str] = &["csv", "txt"];

// ==========================================
// ParsedFile - 解析结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ParsedFile {
    pub table: Table,
    /// 被跳过的畸形行（文件中的 1 基行号）
    pub skipped_rows: Vec<usize>,
}

// ==========================================
// CSV Parser 实现
// ==========================================
#[derive(Debug, Clone)]
pub struct CsvParser {
    delimiter: u8,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self::new(DEFAULT_CSV_DELIMITER)
    }
}

impl CsvParser {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// 从任意读取器解析（文件与内存数据共用）
    pub fn parse_reader<R: std::io::Read>(&self, reader: R) -> ImportResult<ParsedFile> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true) // 允许行长度不一致, 由下方逐行判定
            .from_reader(reader);

        // 读取表头
        let headers: Vec<String> = decode_record(reader.byte_headers()?)
            .into_iter()
            .enumerate()
            .map(|(idx, h)| {
                let h = if idx == 0 {
                    h.trim_start_matches('\u{FEFF}').to_string()
                } else {
                    h
                };
                h.trim().to_string()
            })
            .collect();

        let mut table = Table::new(headers);
        let width = table.columns().len();
        let mut skipped_rows = Vec::new();

        let mut record = ByteRecord::new();
        while reader.read_byte_record(&mut record)? {
            let line = record.position().map(|p| p.line() as usize).unwrap_or(0);

            if record.len() > width {
                warn!(line = line, fields = record.len(), expected = width, "畸形行已跳过");
                skipped_rows.push(line);
                continue;
            }

            let row: Vec<CellValue> = decode_record(&record)
                .into_iter()
                .map(|value| {
                    let trimmed = value.trim();
                    if trimmed.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::text(trimmed)
                    }
                })
                .collect();

            // 跳过完全空白的行
            if row.iter().all(CellValue::is_empty) {
                continue;
            }

            table.push_row_at(row, line);
        }

        debug!(
            rows = table.len(),
            columns = width,
            skipped = skipped_rows.len(),
            "文本表解析完成"
        );
        Ok(ParsedFile {
            table,
            skipped_rows,
        })
    }
}

impl FileParser for CsvParser {
    fn parse_to_table(&self, file_path: &Path) -> ImportResult<ParsedFile> {
        ensure_exists(file_path)?;
        ensure_extension(file_path, TEXT_EXTENSIONS)?;

        let file = std::fs::File::open(file_path)?;
        self.parse_reader(file)
    }
}

/// 按行解码: 整行为合法 UTF-8 则按 UTF-8, 否则整行按 Windows-1252
fn decode_record(record: &ByteRecord) -> Vec<String> {
    let is_utf8 = record.iter().all(|field| std::str::from_utf8(field).is_ok());
    record
        .iter()
        .map(|field| {
            if is_utf8 {
                String::from_utf8_lossy(field).into_owned()
            } else {
                WINDOWS_1252
                    .decode_without_bom_handling(field)
                    .0
                    .into_owned()
            }
        })
        .collect()
}

// ==========================================
// Excel Parser 实现
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_table(&self, file_path: &Path) -> ImportResult<ParsedFile> {
        ensure_exists(file_path)?;
        ensure_extension(file_path, EXCEL_EXTENSIONS)?;

        // 打开工作簿（按扩展名自动识别格式）
        let mut workbook = open_workbook_auto(file_path)?;

        // 读取第一个工作表
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ImportError::EmptyWorkbook(file_path.display().to_string()))??;

        // 提取表头（第一行）
        let mut rows = range.rows();
        let header_row = rows
            .next()
            .ok_or_else(|| ImportError::EmptyWorkbook(file_path.display().to_string()))?;

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        // 读取数据行（工作表行号 = 区域起始行 + 偏移, 1 基）
        let header_line = range.start().map_or(1, |(row, _)| row as usize + 1);
        let mut table = Table::new(headers);
        for (offset, data_row) in rows.enumerate() {
            let row: Vec<CellValue> = data_row.iter().map(excel_cell).collect();

            // 跳过完全空白的行
            if row.iter().all(CellValue::is_empty) {
                continue;
            }

            table.push_row_at(row, header_line + offset + 1);
        }

        debug!(
            rows = table.len(),
            columns = table.columns().len(),
            "工作表解析完成"
        );
        Ok(ParsedFile {
            table,
            skipped_rows: Vec::new(),
        })
    }
}

/// 单元格类型映射（错误单元格视为缺失）
fn excel_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => {
            if s.trim().is_empty() {
                CellValue::Empty
            } else {
                CellValue::text(s.as_str())
            }
        }
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_datetime() {
            Some(dt) => CellValue::DateTime(dt),
            None => CellValue::text(cell.to_string()),
        },
        Data::DurationIso(s) => CellValue::text(s.as_str()),
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct UniversalFileParser {
    csv: CsvParser,
}

impl UniversalFileParser {
    pub fn new(csv_delimiter: u8) -> Self {
        Self {
            csv: CsvParser::new(csv_delimiter),
        }
    }

    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<ParsedFile> {
        let path = file_path.as_ref();
        let ext = extension_of(path);

        if TEXT_EXTENSIONS.contains(&ext.as_str()) {
            self.csv.parse_to_table(path)
        } else if EXCEL_EXTENSIONS.contains(&ext.as_str()) {
            ExcelParser.parse_to_table(path)
        } else {
            Err(ImportError::UnsupportedFormat(ext))
        }
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ImportError::FileNotFound(path.display().to_string()))
    }
}

fn ensure_extension(path: &Path, allowed: &[&str]) -> ImportResult<()> {
    let ext = extension_of(path);
    if allowed.contains(&ext.as_str()) {
        Ok(())
    } else {
        Err(ImportError::UnsupportedFormat(ext))
    }
}
