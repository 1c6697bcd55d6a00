// ==========================================
// 流水线端到端测试
// ==========================================
// 测试目标: 文件加载 → 清洗 → 过滤 → 日期 → 分组 → 宽表 → 导出
// ==========================================

mod helpers;

use helpers::{fixture, DatasetBuilder, InvoiceBuilder};
use recobro_facturas::cli::ProcessArgs;
use recobro_facturas::commands::run_process;
use recobro_facturas::config::PipelineConfig;
use recobro_facturas::domain::{CellValue, NoticeKind};
use recobro_facturas::engine::{DateWindow, DebtStateFilter, Pipeline, ReturnDateFilter};
use recobro_facturas::importer::{CsvParser, FileParser, ImportError, UniversalFileParser};
use recobro_facturas::logging;
use chrono::NaiveDate;
use std::io::Write;

fn process_args(input: std::path::PathBuf, output: std::path::PathBuf) -> ProcessArgs {
    ProcessArgs {
        input,
        output: Some(output),
        config: None,
        estados: Vec::new(),
        antiguedad: None,
        desde: None,
    }
}

// ==========================================
// 基础数据集
// ==========================================

#[test]
fn test_basic_fixture_end_to_end() {
    logging::init_test();

    let parsed = UniversalFileParser::default()
        .parse(fixture("facturas_basico.csv"))
        .unwrap();
    assert_eq!(parsed.skipped_rows, vec![6]);

    let output = Pipeline::new(&PipelineConfig::default()).run_parsed(parsed);
    let table = &output.table;

    // 首次出现顺序
    let ids: Vec<String> = table
        .column_values("fiscalId")
        .unwrap()
        .map(|c| c.render())
        .collect();
    assert_eq!(ids, vec!["B12345678", "A87654321", "C11111111"]);

    // 列数: 6 基础 + 3 电话 + 2 发票 × 4
    assert_eq!(table.columns().len(), 17);

    // B12345678: 两张发票, 电话去重
    assert_eq!(
        table.cell(0, "nombre_empresa"),
        Some(&CellValue::text("PEQUEÑA EMPRESA SL"))
    );
    assert_eq!(table.cell(0, "Suma_Pendientes"), Some(&CellValue::Number(200.0)));
    assert_eq!(
        table.cell(0, "Total_Facturas"),
        Some(&CellValue::text("2 facturas pendientes"))
    );
    assert_eq!(table.cell(0, "telefono_1"), Some(&CellValue::text("600111222")));
    assert_eq!(table.cell(0, "telefono_2"), Some(&CellValue::text("910000000")));
    assert_eq!(table.cell(0, "telefono_3"), Some(&CellValue::text("611222333")));
    assert_eq!(table.cell(0, "fechaDevolucion_1"), Some(&CellValue::text("05/02/2024")));
    assert_eq!(table.cell(0, "fechaDevolucion_2"), Some(&CellValue::text("12/02/2024")));
    assert_eq!(table.cell(0, "invoiceNumber_2"), Some(&CellValue::text("F-2024-003")));

    // A87654321: 畸形行被跳过, 只剩一张发票
    assert_eq!(
        table.cell(1, "nombre_empresa"),
        Some(&CellValue::text("Construcciones Muñoz"))
    );
    assert_eq!(
        table.cell(1, "direccionCliente"),
        Some(&CellValue::text("Avda. España 3"))
    );
    assert_eq!(table.cell(1, "Suma_Pendientes"), Some(&CellValue::Number(80.0)));
    assert_eq!(
        table.cell(1, "Total_Facturas"),
        Some(&CellValue::text("1 factura pendiente"))
    );
    assert_eq!(table.cell(1, "fechaDevolucion_1"), Some(&CellValue::text("10/02/2024")));
    assert_eq!(table.cell(1, "telefono_2"), Some(&CellValue::Empty));
    assert_eq!(table.cell(1, "invoiceNumber_2"), Some(&CellValue::Empty));

    // C11111111: 非数值金额记 0, 日期无法解析置空
    assert_eq!(table.cell(2, "nombre_empresa"), Some(&CellValue::text("Café Ñandú")));
    assert_eq!(table.cell(2, "Suma_Pendientes"), Some(&CellValue::Number(0.0)));
    assert_eq!(table.cell(2, "totalPendiente_1"), Some(&CellValue::Number(0.0)));
    assert_eq!(table.cell(2, "fechaDevolucion_1"), Some(&CellValue::Empty));

    let report = &output.report;
    assert_eq!(report.input_rows, 5);
    assert_eq!(report.grouped_rows, 4);
    assert_eq!(report.customers, 3);
    assert_eq!(report.repaired_cells, 3);
    assert_eq!(report.count(NoticeKind::MalformedRowSkipped), 1);
    assert_eq!(report.count(NoticeKind::MissingKeyValue), 1);
    assert_eq!(report.count(NoticeKind::NumericCoercionFailed), 1);
    assert_eq!(report.count(NoticeKind::DateParseFailed), 1);
    assert!(!report.has(NoticeKind::MissingKeyColumn));
}

#[test]
fn test_notice_rows_are_file_lines() {
    let parsed = UniversalFileParser::default()
        .parse(fixture("facturas_basico.csv"))
        .unwrap();
    let output = Pipeline::new(&PipelineConfig::default()).run_parsed(parsed);

    let line_of = |kind: NoticeKind| {
        output
            .report
            .notices
            .iter()
            .find(|n| n.kind == kind)
            .and_then(|n| n.row_number)
    };
    assert_eq!(line_of(NoticeKind::MalformedRowSkipped), Some(6));
    assert_eq!(line_of(NoticeKind::DateParseFailed), Some(5));
    assert_eq!(line_of(NoticeKind::NumericCoercionFailed), Some(5));
    assert_eq!(line_of(NoticeKind::MissingKeyValue), Some(7));
}

#[test]
fn test_filtered_rows_keep_their_file_lines() {
    let table = DatasetBuilder::standard()
        .invoice(InvoiceBuilder::new("A1").total("10").estado("Pagado"))
        .invoice(InvoiceBuilder::new("B2").fecha("sin fecha").total("5").estado("Impagado"))
        .to_table();

    let output = Pipeline::new(&PipelineConfig::default())
        .with_filter(Box::new(DebtStateFilter::new(vec!["Impagado".into()])))
        .run(table);

    let notice = output
        .report
        .notices
        .iter()
        .find(|n| n.kind == NoticeKind::DateParseFailed)
        .unwrap();
    // 第一行被过滤掉, 行号仍指向源数据第 3 行
    assert_eq!(notice.row_number, Some(3));
}

#[test]
fn test_missing_fiscal_id_column_is_not_fatal() {
    let parsed = CsvParser::default()
        .parse_to_table(&fixture("facturas_sin_fiscal_id.csv"))
        .unwrap();

    let output = Pipeline::new(&PipelineConfig::default()).run_parsed(parsed);

    assert!(output.table.is_empty());
    assert!(output.report.has(NoticeKind::MissingKeyColumn));
    assert_eq!(output.report.customers, 0);
}

// ==========================================
// 过滤
// ==========================================

#[test]
fn test_filters_run_before_grouping() {
    let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let table = DatasetBuilder::standard()
        .invoice(InvoiceBuilder::new("A1").fecha("20/02/2024").total("10").estado("Impagado").factura("F1"))
        .invoice(InvoiceBuilder::new("A1").fecha("01/01/2024").total("20").estado("Impagado").factura("F2"))
        .invoice(InvoiceBuilder::new("A1").fecha("15/02/2024").total("40").estado("Pagado").factura("F3"))
        .invoice(InvoiceBuilder::new("B2").fecha("10/02/2024").total("5").estado("Impagado").factura("F4"))
        .to_table();

    let output = Pipeline::new(&PipelineConfig::default())
        .with_filter(Box::new(DebtStateFilter::new(vec!["Impagado".into()])))
        .with_filter(Box::new(ReturnDateFilter::new(DateWindow::Between9And30Days, today)))
        .run(table);

    assert_eq!(output.report.filtered_rows, 2);
    assert_eq!(output.table.len(), 2);
    assert_eq!(output.table.cell(0, "Suma_Pendientes"), Some(&CellValue::Number(10.0)));
    assert_eq!(output.table.cell(1, "invoiceNumber_1"), Some(&CellValue::text("F4")));
}

// ==========================================
// 编码
// ==========================================

#[test]
fn test_windows_1252_input_is_decoded_and_normalized() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("latin1.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(b"fiscalId;nombre_empresa;totalPendiente\n").unwrap();
    file.write_all(b"A1;Pe\xF1a   Hermanos;12.5\n").unwrap();
    file.write_all("A1;PEÑA HERMANOS;7.5\n".as_bytes()).unwrap();
    drop(file);

    let parsed = UniversalFileParser::default().parse(&path).unwrap();
    let output = Pipeline::new(&PipelineConfig::default()).run_parsed(parsed);

    assert_eq!(
        output.table.cell(0, "nombre_empresa"),
        Some(&CellValue::text("Peña Hermanos"))
    );
    assert_eq!(output.table.cell(0, "Suma_Pendientes"), Some(&CellValue::Number(20.0)));
}

#[test]
fn test_invalid_workbook_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roto.xlsx");
    std::fs::write(&path, b"esto no es un libro de Excel").unwrap();

    let result = UniversalFileParser::default().parse(&path);
    assert!(matches!(result, Err(ImportError::ExcelParseError(_))));
}

// ==========================================
// 命令行流程
// ==========================================

#[test]
fn test_run_process_writes_wide_table() {
    let dir = tempfile::tempdir().unwrap();
    let output_path = dir.path().join("salida.csv");

    let summary = run_process(&process_args(fixture("facturas_basico.csv"), output_path.clone()))
        .unwrap();

    assert_eq!(summary.output_rows, 3);
    assert_eq!(summary.output_columns, 17);

    // 导出文件可按同样的分隔符读回
    let reloaded = CsvParser::default().parse_to_table(&output_path).unwrap();
    assert_eq!(reloaded.table.len(), 3);
    assert_eq!(reloaded.table.columns()[4], "Suma_Pendientes");
    assert_eq!(
        reloaded.table.cell(0, "Suma_Pendientes"),
        Some(&CellValue::text("200"))
    );
    assert_eq!(
        reloaded.table.cell(1, "Total_Facturas"),
        Some(&CellValue::text("1 factura pendiente"))
    );
}

#[test]
fn test_run_process_with_config_file_filter() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    std::fs::write(&config_path, r#"{"debt_states": ["Impagado"]}"#).unwrap();
    let output_path = dir.path().join("salida.csv");

    let mut args = process_args(fixture("facturas_basico.csv"), output_path);
    args.config = Some(config_path);
    let summary = run_process(&args).unwrap();

    assert_eq!(summary.report.filtered_rows, 3);
    assert_eq!(summary.output_rows, 1);
}

#[test]
fn test_run_process_missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_process(&process_args(
        dir.path().join("no_existe.csv"),
        dir.path().join("salida.csv"),
    ));
    assert!(result.is_err());
}
