// ==========================================
// 发票催收汇总系统 - 命令执行
// ==========================================
// 职责: 配置分层 → 加载 → 流水线 → 导出 → 摘要
// 红线: 仅加载/导出/配置失败返回 Err; 核心状况只进摘要
// ==========================================

use crate::cli::{NormalizeArgs, ProcessArgs};
use crate::config::{ConfigManager, PipelineConfig};
use crate::domain::report::{NoticeKind, RunReport};
use crate::engine::date_formatter::parse_day_first;
use crate::engine::orchestrator::Pipeline;
use crate::engine::row_filter::DateWindow;
use crate::engine::text_normalizer::{RepairStatus, TextNormalizer};
use crate::exporter::CsvExporter;
use crate::importer::UniversalFileParser;
use anyhow::{bail, Context};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 默认输出文件名
pub const DEFAULT_OUTPUT_FILE: &str = "resultado.csv";

// 摘要中按此顺序列出状况
const NOTICE_ORDER: [NoticeKind; 6] = [
    NoticeKind::MissingKeyColumn,
    NoticeKind::MissingKeyValue,
    NoticeKind::MalformedRowSkipped,
    NoticeKind::EncodingRepairFailed,
    NoticeKind::NumericCoercionFailed,
    NoticeKind::DateParseFailed,
];

/// process 子命令结果
#[derive(Debug, Clone)]
pub struct ProcessSummary {
    pub output_path: PathBuf,
    pub output_rows: usize,
    pub output_columns: usize,
    pub report: RunReport,
}

/// 执行 process 子命令
pub fn run_process(args: &ProcessArgs) -> anyhow::Result<ProcessSummary> {
    // 配置: 默认值 → 文件 → 环境变量 → 命令行
    let mut manager = ConfigManager::load(args.config.as_deref()).context("加载配置失败")?;
    apply_cli_overrides(manager.config_mut(), args)?;
    let config = manager.config().clone();
    config.validate().context("配置校验失败")?;
    info!(config = %manager.get_config_snapshot()?, "生效配置");

    // 加载
    let parser = UniversalFileParser::new(config.csv_delimiter_byte()?);
    let parsed = parser
        .parse(&args.input)
        .with_context(|| format!("无法加载输入文件: {}", args.input.display()))?;

    // 流水线
    let pipeline = Pipeline::from_config(&config);
    debug!(filters = ?pipeline.filter_names(), "流水线已装配");
    let output = pipeline.run_parsed(parsed);

    // 导出
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input));
    if same_file(&output_path, &args.input) {
        bail!("输出文件与输入文件相同: {}", output_path.display());
    }
    CsvExporter::new(config.output_delimiter_byte()?)
        .write_to_path(&output.table, &output_path)
        .with_context(|| format!("无法写出结果文件: {}", output_path.display()))?;

    Ok(ProcessSummary {
        output_path,
        output_rows: output.table.len(),
        output_columns: output.table.columns().len(),
        report: output.report,
    })
}

/// 命令行层覆写（最高优先级）
pub fn apply_cli_overrides(config: &mut PipelineConfig, args: &ProcessArgs) -> anyhow::Result<()> {
    if !args.estados.is_empty() {
        config.debt_states = args.estados.clone();
    }
    if let Some(window) = args.antiguedad {
        config.return_date_window = Some(window);
    }
    if let Some(raw) = &args.desde {
        let Some(date) = parse_day_first(raw) else {
            bail!("无法解析 --desde 日期: {} (期望 DD/MM/YYYY)", raw);
        };
        config.return_date_window = Some(DateWindow::Since(date));
    }
    Ok(())
}

/// 输入文件同目录下的 resultado.csv
///
/// 输入本身名为 resultado.csv 时改用 `<stem>_resultado.csv`, 不覆盖源数据
pub fn default_output_path(input: &Path) -> PathBuf {
    let dir = input.parent().unwrap_or_else(|| Path::new(""));
    let collides = input
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.eq_ignore_ascii_case(DEFAULT_OUTPUT_FILE));
    if !collides {
        return dir.join(DEFAULT_OUTPUT_FILE);
    }
    let stem = input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("entrada");
    dir.join(format!("{}_{}", stem, DEFAULT_OUTPUT_FILE))
}

// 两个路径是否指向同一文件（文件不存在时按字面比较）
fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// 运行摘要（打印到 stdout）
pub fn format_summary(summary: &ProcessSummary) -> String {
    let report = &summary.report;
    let mut out = String::new();
    let _ = writeln!(out, "运行 ID:      {}", report.run_id);
    let _ = writeln!(out, "输入行数:     {}", report.input_rows);
    let _ = writeln!(out, "过滤后行数:   {}", report.filtered_rows);
    let _ = writeln!(out, "客户数:       {}", report.customers);
    let _ = writeln!(
        out,
        "文本修复:     {} 个单元格已修复, {} 个无法修复",
        report.repaired_cells, report.unrepairable_cells
    );
    for kind in NOTICE_ORDER {
        let count = report.count(kind);
        if count > 0 {
            let _ = writeln!(out, "  {:?}: {}", kind, count);
        }
    }
    let _ = writeln!(
        out,
        "输出:         {} ({} 行 × {} 列)",
        summary.output_path.display(),
        summary.output_rows,
        summary.output_columns
    );
    out
}

/// 执行 normalize 子命令, 返回 "规范化文本\t状态"
pub fn run_normalize(args: &NormalizeArgs) -> String {
    let normalized = TextNormalizer::default().normalize_detailed(&args.text);
    let status = match normalized.status {
        RepairStatus::Repaired => "repaired",
        RepairStatus::Clean => "clean",
        RepairStatus::Unrepairable => "unrepairable",
    };
    format!("{}\t{}", normalized.text, status)
}
