// ==========================================
// 发票催收汇总系统 - 按客户分组聚合器
// ==========================================
// 职责: 多条发票行 → 每个 fiscalId 一条客户汇总
// 规则:
// 1. totalPendiente 强制转数值, 失败记 0（仍计入发票数）
// 2. 按 fiscalId 首次出现顺序稳定分组（不排序）
// 3. 描述性字段取组内首行（后续不同值静默丢弃, 已知限制）
// 4. 金额求和后四舍五入到 2 位小数
// 5. 三个电话来源列展平 → 去空 → 保序去重
// 6. 每行输出一个发票四元组, 保持组内原始相对顺序
// 7. Total_Facturas 西语单复数
// 红线: 纯函数, 不持有跨调用的可变状态
// ==========================================

use crate::domain::invoice::{
    columns, total_facturas_label, CustomerSummary, InvoiceLine, InvoiceRow,
};
use crate::domain::report::{Notice, NoticeKind};
use crate::domain::table::CellValue;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

// ==========================================
// GroupOutcome - 分组结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct GroupOutcome {
    pub summaries: Vec<CustomerSummary>,
    pub grouped_rows: usize,
    pub notices: Vec<Notice>,
}

// ==========================================
// RowGrouper
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct RowGrouper;

impl RowGrouper {
    pub fn new() -> Self {
        Self
    }

    /// 分组聚合
    ///
    /// # 参数
    /// - rows: 已完成文本清洗与日期格式化的发票行
    ///
    /// # 返回
    /// - summaries: 按 fiscalId 首次出现顺序排列的客户汇总
    /// - notices: MissingKeyValue / NumericCoercionFailed
    pub fn group(&self, rows: &[InvoiceRow]) -> GroupOutcome {
        let mut notices = Vec::new();

        // 步骤 1+2: 强制转换金额 + 稳定分组
        let mut slot_by_key: HashMap<String, usize> = HashMap::new();
        let mut groups: Vec<Vec<(&InvoiceRow, f64)>> = Vec::new();

        for row in rows {
            if row.fiscal_id.is_blank() {
                notices.push(
                    Notice::new(NoticeKind::MissingKeyValue, "fiscalId 为空, 该行不参与分组")
                        .at_row(row.row_number)
                        .in_column(columns::FISCAL_ID),
                );
                continue;
            }

            let amount = match coerce_amount(&row.total_pendiente) {
                Some(value) => value,
                None => {
                    if !row.total_pendiente.is_blank() {
                        notices.push(
                            Notice::new(
                                NoticeKind::NumericCoercionFailed,
                                format!("无法解析为数值, 按 0 计: {}", row.total_pendiente),
                            )
                            .at_row(row.row_number)
                            .in_column(columns::TOTAL_PENDIENTE),
                        );
                    }
                    0.0
                }
            };

            let key = group_key(&row.fiscal_id);
            let slot = *slot_by_key.entry(key).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[slot].push((row, amount));
        }

        // 步骤 3-7: 逐组汇总
        let grouped_rows = groups.iter().map(Vec::len).sum();
        let summaries: Vec<CustomerSummary> = groups.iter().map(|g| summarize(g)).collect();

        info!(
            input_rows = rows.len(),
            grouped_rows = grouped_rows,
            customers = summaries.len(),
            "按客户分组完成"
        );

        GroupOutcome {
            summaries,
            grouped_rows,
            notices,
        }
    }
}

/// 单组汇总（组非空）
fn summarize(group: &[(&InvoiceRow, f64)]) -> CustomerSummary {
    let (first, _) = group[0];
    let total: f64 = group.iter().map(|(_, amount)| amount).sum();

    let telefonos = collect_phones(group.iter().map(|(row, _)| *row));
    let facturas: Vec<InvoiceLine> = group
        .iter()
        .map(|(row, amount)| InvoiceLine {
            fecha_devolucion: row.fecha_devolucion.clone(),
            total_pendiente: *amount,
            estado_deuda: row.estado_deuda.clone(),
            invoice_number: row.invoice_number.clone(),
        })
        .collect();

    debug!(
        fiscal_id = %first.fiscal_id,
        invoices = facturas.len(),
        phones = telefonos.len(),
        "客户汇总生成"
    );

    CustomerSummary {
        fiscal_id: first.fiscal_id.clone(),
        nombre_empresa: first.nombre_empresa.clone(),
        direccion_cliente: first.direccion_cliente.clone(),
        email_facturacion: first.email_facturacion.clone(),
        suma_pendientes: round2(total),
        total_facturas: total_facturas_label(group.len()),
        telefonos,
        facturas,
    }
}

/// 分组键: 单元格渲染文本（Number(123) 与 Text("123") 视为同一客户）
fn group_key(cell: &CellValue) -> String {
    cell.render().trim().to_string()
}

/// 电话候选: 逐行按来源列顺序展平, 去空, 保序去重
pub fn collect_phones<'a>(rows: impl Iterator<Item = &'a InvoiceRow>) -> Vec<CellValue> {
    let mut seen = HashSet::new();
    let mut phones = Vec::new();
    for row in rows {
        for candidate in row.phone_candidates() {
            if candidate.is_blank() {
                continue;
            }
            if seen.insert(group_key(candidate)) {
                phones.push(candidate.clone());
            }
        }
    }
    phones
}

/// 金额强制转换（NumericCoercionFailed → None）
///
/// 文本按 `.` 小数点解析, "100,50" 视为非数值; inf/NaN 视为非数值
pub fn coerce_amount(cell: &CellValue) -> Option<f64> {
    let value = match cell {
        CellValue::Number(n) => *n,
        CellValue::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
        CellValue::Empty | CellValue::DateTime(_) => return None,
    };
    value.is_finite().then_some(value)
}

/// 两位小数, 半数远离零
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
