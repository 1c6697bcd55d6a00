// ==========================================
// 发票催收汇总系统 - 宽表构建器
// ==========================================
// 职责: 客户汇总列表 → 每客户一行的宽表
// 两遍构建:
//   第一遍: 统计全体客户的最大电话数 k 与最大发票数 n
//   第二遍: 按固定列序输出, 不足的位置补空
// 列序:
//   fiscalId, nombre_empresa, direccionCliente, emailFacturacion,
//   Suma_Pendientes, Total_Facturas, telefono_1..k,
//   然后按布局输出发票四元组列
// ==========================================

use crate::domain::invoice::{columns, CustomerSummary, InvoiceLine};
use crate::domain::table::{CellValue, Table};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 发票四元组列的排列方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WideLayout {
    /// fechaDevolucion_1..n, totalPendiente_1..n, Estado_deuda_1..n, invoiceNumber_1..n
    #[default]
    ByAttribute,
    /// fechaDevolucion_1, totalPendiente_1, Estado_deuda_1, invoiceNumber_1, fechaDevolucion_2, ...
    ByInvoice,
}

#[derive(Debug, Clone, Default)]
pub struct WideTableBuilder {
    layout: WideLayout,
}

impl WideTableBuilder {
    pub fn new(layout: WideLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> WideLayout {
        self.layout
    }

    /// 构建宽表（空输入 → 仅基础列, 零行）
    pub fn build(&self, summaries: &[CustomerSummary]) -> Table {
        // 第一遍: 列宽
        let max_phones = summaries.iter().map(|s| s.phone_count()).max().unwrap_or(0);
        let max_invoices = summaries.iter().map(|s| s.invoice_count()).max().unwrap_or(0);

        let slots = self.invoice_slots(max_invoices);
        let mut header = base_columns();
        header.extend((1..=max_phones).map(|i| columns::indexed(columns::TELEFONO_PREFIX, i)));
        header.extend(
            slots
                .iter()
                .map(|&(attribute, i)| columns::indexed(columns::INVOICE_QUADRUPLE[attribute], i + 1)),
        );

        // 第二遍: 逐客户填充
        let mut table = Table::new(header);
        for summary in summaries {
            let mut row = Vec::with_capacity(table.columns().len());
            row.push(summary.fiscal_id.clone());
            row.push(summary.nombre_empresa.clone());
            row.push(summary.direccion_cliente.clone());
            row.push(summary.email_facturacion.clone());
            row.push(CellValue::Number(summary.suma_pendientes));
            row.push(CellValue::text(summary.total_facturas.as_str()));

            for i in 0..max_phones {
                row.push(summary.telefonos.get(i).cloned().unwrap_or_default());
            }
            for &(attribute, i) in &slots {
                row.push(
                    summary
                        .facturas
                        .get(i)
                        .map(|line| invoice_cell(line, attribute))
                        .unwrap_or_default(),
                );
            }
            table.push_row(row);
        }

        debug!(
            customers = summaries.len(),
            max_phones = max_phones,
            max_invoices = max_invoices,
            columns = table.columns().len(),
            "宽表构建完成"
        );
        table
    }

    /// 发票槽位 (四元组属性下标, 发票下标)
    fn invoice_slots(&self, max_invoices: usize) -> Vec<(usize, usize)> {
        let attributes = columns::INVOICE_QUADRUPLE.len();
        match self.layout {
            WideLayout::ByAttribute => (0..attributes)
                .flat_map(|a| (0..max_invoices).map(move |i| (a, i)))
                .collect(),
            WideLayout::ByInvoice => (0..max_invoices)
                .flat_map(|i| (0..attributes).map(move |a| (a, i)))
                .collect(),
        }
    }
}

/// 固定的前 6 列
pub fn base_columns() -> Vec<String> {
    vec![
        columns::FISCAL_ID.to_string(),
        columns::NOMBRE_EMPRESA.to_string(),
        columns::DIRECCION_CLIENTE.to_string(),
        columns::EMAIL_FACTURACION.to_string(),
        columns::SUMA_PENDIENTES.to_string(),
        columns::TOTAL_FACTURAS.to_string(),
    ]
}

// 顺序与 columns::INVOICE_QUADRUPLE 一致
fn invoice_cell(line: &InvoiceLine, attribute: usize) -> CellValue {
    match attribute {
        0 => line.fecha_devolucion.clone(),
        1 => CellValue::Number(line.total_pendiente),
        2 => line.estado_deuda.clone(),
        _ => line.invoice_number.clone(),
    }
}
