//! 命令行参数定义

use crate::engine::row_filter::DateWindow;
use crate::logging::{LogFormat, LogOptions};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "recobro",
    version,
    about = "发票催收汇总: 修复乱码并按 fiscalId 生成每客户一行的宽表"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// 日志级别或过滤器（覆盖 RUST_LOG）, 例如 debug
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// 日志格式
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 处理发票文件并写出客户宽表
    Process(ProcessArgs),

    /// 规范化一段文本并打印修复结果（诊断用）
    Normalize(NormalizeArgs),
}

#[derive(Debug, Parser)]
pub struct ProcessArgs {
    /// 输入文件（.xlsx/.xls/.xlsm/.ods/.csv/.txt）
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// 输出文件（默认: 输入文件同目录下的 resultado.csv）
    #[arg(short = 'o', long = "output", value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// JSON 配置文件
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// 仅保留这些 Estado_deuda 取值（可重复）
    #[arg(long = "estado", value_name = "STATE")]
    pub estados: Vec<String>,

    /// 按 fechaDevolucion 的账龄窗口过滤: 9-30 或 9-60
    #[arg(long = "antiguedad", value_name = "WINDOW", conflicts_with = "desde")]
    pub antiguedad: Option<DateWindow>,

    /// 仅保留 fechaDevolucion 不早于该日期的行（DD/MM/YYYY）
    #[arg(long = "desde", value_name = "DD/MM/YYYY")]
    pub desde: Option<String>,
}

#[derive(Debug, Parser)]
pub struct NormalizeArgs {
    /// 待规范化的文本
    #[arg(value_name = "TEXT")]
    pub text: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Json,
}

impl Cli {
    pub fn log_options(&self) -> LogOptions {
        LogOptions {
            level: self.log_level.clone(),
            format: match self.log_format {
                LogFormatArg::Pretty => LogFormat::Pretty,
                LogFormatArg::Json => LogFormat::Json,
            },
        }
    }
}
