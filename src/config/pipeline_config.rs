// ==========================================
// 发票催收汇总系统 - 流水线配置
// ==========================================
// 职责: 流水线可调参数（serde 反序列化, 缺省字段取默认值）
// ==========================================

use crate::config::error::ConfigError;
use crate::engine::date_formatter::DEFAULT_DATE_COLUMNS;
use crate::engine::row_filter::DateWindow;
use crate::engine::text_normalizer::DEFAULT_MAX_PASSES;
use crate::engine::wide_table::WideLayout;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    // ===== 输入 =====
    pub csv_delimiter: char,

    // ===== 文本清洗 =====
    pub max_normalize_passes: usize,

    // ===== 日期 =====
    pub date_columns: Vec<String>,

    // ===== 行过滤 =====
    pub debt_states: Vec<String>,               // 空 = 不过滤
    pub return_date_window: Option<DateWindow>, // None = 不过滤

    // ===== 输出 =====
    pub output_delimiter: char,
    pub wide_layout: WideLayout,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            csv_delimiter: ';',
            max_normalize_passes: DEFAULT_MAX_PASSES,
            date_columns: DEFAULT_DATE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            debt_states: Vec::new(),
            return_date_window: None,
            output_delimiter: ';',
            wide_layout: WideLayout::default(),
        }
    }
}

impl PipelineConfig {
    /// 校验配置取值
    pub fn validate(&self) -> Result<(), ConfigError> {
        delimiter_byte("csv_delimiter", self.csv_delimiter)?;
        delimiter_byte("output_delimiter", self.output_delimiter)?;
        if self.max_normalize_passes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_normalize_passes".to_string(),
                value: "0".to_string(),
                message: "至少为 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn csv_delimiter_byte(&self) -> Result<u8, ConfigError> {
        delimiter_byte("csv_delimiter", self.csv_delimiter)
    }

    pub fn output_delimiter_byte(&self) -> Result<u8, ConfigError> {
        delimiter_byte("output_delimiter", self.output_delimiter)
    }
}

/// 分隔符必须是单个 ASCII 字符（换行与引号除外）
pub fn delimiter_byte(key: &str, delimiter: char) -> Result<u8, ConfigError> {
    if delimiter.is_ascii() && !matches!(delimiter, '\n' | '\r' | '"') {
        Ok(delimiter as u8)
    } else {
        Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: delimiter.escape_default().to_string(),
            message: "分隔符必须是单个 ASCII 字符".to_string(),
        })
    }
}
