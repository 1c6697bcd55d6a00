// ==========================================
// 发票催收汇总系统 - 流水线编排器
// ==========================================
// 用途: 协调清洗 / 过滤 / 日期 / 映射 / 分组 / 宽表 的执行顺序
// 红线: 任何核心状况都不中断流水线, 全部记入 RunReport
// ==========================================

use crate::config::PipelineConfig;
use crate::domain::invoice::CustomerSummary;
use crate::domain::report::{Notice, NoticeKind, RunReport};
use crate::domain::table::Table;
use crate::engine::date_formatter::DateFormatter;
use crate::engine::row_filter::{DebtStateFilter, ReturnDateFilter, RowFilter};
use crate::engine::row_grouper::RowGrouper;
use crate::engine::wide_table::WideTableBuilder;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::ParsedFile;
use crate::importer::importer_trait::{DataCleaner as _, FieldMapper as _};
use crate::importer::ImportError;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

// ==========================================
// PipelineOutput - 流水线结果
// ==========================================
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// 每客户一行的宽表
    pub table: Table,
    pub summaries: Vec<CustomerSummary>,
    pub report: RunReport,
}

// ==========================================
// Pipeline - 流水线编排器
// ==========================================
pub struct Pipeline {
    cleaner: DataCleaner,
    mapper: FieldMapper,
    filters: Vec<Box<dyn RowFilter>>,
    date_formatter: DateFormatter,
    date_columns: Vec<String>,
    grouper: RowGrouper,
    wide_builder: WideTableBuilder,
}

impl Pipeline {
    /// 按配置创建（不含过滤器）
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            cleaner: DataCleaner::with_max_passes(config.max_normalize_passes),
            mapper: FieldMapper,
            filters: Vec::new(),
            date_formatter: DateFormatter::new(),
            date_columns: config.date_columns.clone(),
            grouper: RowGrouper::new(),
            wide_builder: WideTableBuilder::new(config.wide_layout),
        }
    }

    /// 按配置创建, 并装配配置中的过滤器（状态白名单在前, 日期窗口在后）
    pub fn from_config(config: &PipelineConfig) -> Self {
        let mut pipeline = Self::new(config);
        if !config.debt_states.is_empty() {
            pipeline = pipeline.with_filter(Box::new(DebtStateFilter::new(
                config.debt_states.clone(),
            )));
        }
        if let Some(window) = config.return_date_window {
            pipeline = pipeline.with_filter(Box::new(ReturnDateFilter::from_today(window)));
        }
        pipeline
    }

    /// 追加过滤器（按追加顺序应用）
    pub fn with_filter(mut self, filter: Box<dyn RowFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// 处理解析结果（畸形行计入报告）
    pub fn run_parsed(&self, parsed: ParsedFile) -> PipelineOutput {
        let skipped: Vec<Notice> = parsed
            .skipped_rows
            .iter()
            .map(|&line| {
                Notice::new(NoticeKind::MalformedRowSkipped, "字段数多于表头, 已跳过")
                    .at_row(line)
            })
            .collect();

        let mut output = self.run(parsed.table);
        if !skipped.is_empty() {
            let mut notices = skipped;
            notices.append(&mut output.report.notices);
            output.report.notices = notices;
        }
        output
    }

    /// 执行完整流水线
    ///
    /// # 步骤
    /// 1. 文本清洗（每个文本单元格）
    /// 2. 行过滤（按追加顺序）
    /// 3. 日期格式化
    /// 4. 字段映射（缺少 fiscalId 列 → 空表 + 状况）
    /// 5. 按客户分组
    /// 6. 宽表构建
    pub fn run(&self, table: Table) -> PipelineOutput {
        let run_id = Uuid::new_v4().to_string();
        let span = info_span!("pipeline", run_id = %run_id);
        let _guard = span.enter();

        let mut report = RunReport::new(run_id.clone());
        report.input_rows = table.len();
        info!(rows = table.len(), columns = table.columns().len(), "开始执行流水线");

        // ==========================================
        // 步骤1: 文本清洗
        // ==========================================
        let cleaned = self.cleaner.clean_table(table);
        report.repaired_cells = cleaned.repaired;
        report.unrepairable_cells = cleaned.unrepairable;
        report.extend(cleaned.notices);
        let mut table = cleaned.table;

        // ==========================================
        // 步骤2: 行过滤
        // ==========================================
        for filter in &self.filters {
            table = filter.apply(table);
            debug!(filter = filter.name(), rows = table.len(), "过滤器已应用");
        }
        report.filtered_rows = table.len();

        // ==========================================
        // 步骤3: 日期格式化
        // ==========================================
        let (table, date_notices) = self.date_formatter.format_dates(table, &self.date_columns);
        report.extend(date_notices);

        // ==========================================
        // 步骤4: 字段映射
        // ==========================================
        let rows = match self.mapper.map_rows(&table) {
            Ok(rows) => rows,
            Err(ImportError::MissingKeyColumn(column)) => {
                warn!(column = %column, "缺少客户键列, 输出空表");
                report.record(
                    Notice::new(NoticeKind::MissingKeyColumn, "表中没有 fiscalId 列, 结果为空")
                        .in_column(column),
                );
                return PipelineOutput {
                    table: self.wide_builder.build(&[]),
                    summaries: Vec::new(),
                    report,
                };
            }
            Err(other) => {
                // map_rows 仅产生 MissingKeyColumn
                warn!(error = %other, "字段映射失败, 输出空表");
                return PipelineOutput {
                    table: self.wide_builder.build(&[]),
                    summaries: Vec::new(),
                    report,
                };
            }
        };

        // ==========================================
        // 步骤5: 按客户分组
        // ==========================================
        let grouped = self.grouper.group(&rows);
        report.grouped_rows = grouped.grouped_rows;
        report.customers = grouped.summaries.len();
        report.extend(grouped.notices);

        // ==========================================
        // 步骤6: 宽表构建
        // ==========================================
        let wide = self.wide_builder.build(&grouped.summaries);

        info!(
            input_rows = report.input_rows,
            filtered_rows = report.filtered_rows,
            customers = report.customers,
            repaired_cells = report.repaired_cells,
            notices = report.notices.len(),
            "流水线执行完成"
        );

        PipelineOutput {
            table: wide,
            summaries: grouped.summaries,
            report,
        }
    }
}
