// ==========================================
// 发票催收汇总系统 - 字段映射器实现
// ==========================================
// 职责: 内存表 → InvoiceRow 列表
// 规则: 列名精确匹配（区分大小写, 无别名）; 缺失的非键列 → Empty
// ==========================================

use crate::domain::invoice::{columns, InvoiceRow};
use crate::domain::table::{CellValue, Table};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::FieldMapper as FieldMapperTrait;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct FieldMapper;

impl FieldMapperTrait for FieldMapper {
    fn map_rows(&self, table: &Table) -> ImportResult<Vec<InvoiceRow>> {
        if !table.has_column(columns::FISCAL_ID) {
            return Err(ImportError::MissingKeyColumn(columns::FISCAL_ID.to_string()));
        }

        let index = ColumnIndex::resolve(table);
        let rows: Vec<InvoiceRow> = table
            .rows()
            .iter()
            .enumerate()
            .map(|(idx, row)| index.map_row(row, table.source_line(idx).unwrap_or(idx + 2)))
            .collect();

        debug!(
            rows = rows.len(),
            missing_columns = index.missing_count(),
            "字段映射完成"
        );
        Ok(rows)
    }
}

// 列下标缓存（每表解析一次）
struct ColumnIndex {
    fiscal_id: Option<usize>,
    nombre_empresa: Option<usize>,
    direccion_cliente: Option<usize>,
    email_facturacion: Option<usize>,
    telefono_contacto: Option<usize>,
    telefono_cabecera: Option<usize>,
    telefono_3: Option<usize>,
    fecha_devolucion: Option<usize>,
    total_pendiente: Option<usize>,
    estado_deuda: Option<usize>,
    invoice_number: Option<usize>,
}

impl ColumnIndex {
    fn resolve(table: &Table) -> Self {
        Self {
            fiscal_id: table.column_index(columns::FISCAL_ID),
            nombre_empresa: table.column_index(columns::NOMBRE_EMPRESA),
            direccion_cliente: table.column_index(columns::DIRECCION_CLIENTE),
            email_facturacion: table.column_index(columns::EMAIL_FACTURACION),
            telefono_contacto: table.column_index(columns::TELEFONO_CONTACTO),
            telefono_cabecera: table.column_index(columns::TELEFONO_CABECERA),
            telefono_3: table.column_index(columns::TELEFONO_3),
            fecha_devolucion: table.column_index(columns::FECHA_DEVOLUCION),
            total_pendiente: table.column_index(columns::TOTAL_PENDIENTE),
            estado_deuda: table.column_index(columns::ESTADO_DEUDA),
            invoice_number: table.column_index(columns::INVOICE_NUMBER),
        }
    }

    fn missing_count(&self) -> usize {
        [
            self.fiscal_id,
            self.nombre_empresa,
            self.direccion_cliente,
            self.email_facturacion,
            self.telefono_contacto,
            self.telefono_cabecera,
            self.telefono_3,
            self.fecha_devolucion,
            self.total_pendiente,
            self.estado_deuda,
            self.invoice_number,
        ]
        .iter()
        .filter(|c| c.is_none())
        .count()
    }

    fn map_row(&self, row: &[CellValue], row_number: usize) -> InvoiceRow {
        let get = |col: Option<usize>| -> CellValue {
            col.and_then(|c| row.get(c)).cloned().unwrap_or_default()
        };

        InvoiceRow {
            // 客户键
            fiscal_id: get(self.fiscal_id),

            // 描述性字段
            nombre_empresa: get(self.nombre_empresa),
            direccion_cliente: get(self.direccion_cliente),
            email_facturacion: get(self.email_facturacion),

            // 候选电话
            telefono_contacto: get(self.telefono_contacto),
            telefono_cabecera: get(self.telefono_cabecera),
            telefono_3: get(self.telefono_3),

            // 发票明细
            fecha_devolucion: get(self.fecha_devolucion),
            total_pendiente: get(self.total_pendiente),
            estado_deuda: get(self.estado_deuda),
            invoice_number: get(self.invoice_number),

            // 元信息
            row_number,
        }
    }
}
