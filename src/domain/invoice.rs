// ==========================================
// 发票催收汇总系统 - 发票领域模型
// ==========================================
// 职责: 输入行 InvoiceRow / 输出客户汇总 CustomerSummary
// 生命周期: 仅存在于一次流水线运行内, 不落库
// ==========================================

use crate::domain::table::CellValue;
use serde::{Deserialize, Serialize};

// ==========================================
// 列名常量（区分大小写, 与导出文件列名一致）
// ==========================================
pub mod columns {
    pub const FISCAL_ID: &str = "fiscalId";
    pub const NOMBRE_EMPRESA: &str = "nombre_empresa";
    pub const DIRECCION_CLIENTE: &str = "direccionCliente";
    pub const EMAIL_FACTURACION: &str = "emailFacturacion";

    pub const TELEFONO_CONTACTO: &str = "telefonoContacto";
    pub const TELEFONO_CABECERA: &str = "telefonoCabecera";
    pub const TELEFONO_3: &str = "telefono3";

    pub const FECHA_DEVOLUCION: &str = "fechaDevolucion";
    pub const TOTAL_PENDIENTE: &str = "totalPendiente";
    pub const ESTADO_DEUDA: &str = "Estado_deuda";
    pub const INVOICE_NUMBER: &str = "invoiceNumber";

    pub const SUMA_PENDIENTES: &str = "Suma_Pendientes";
    pub const TOTAL_FACTURAS: &str = "Total_Facturas";
    pub const TELEFONO_PREFIX: &str = "telefono";

    /// 电话来源列（读取顺序即去重时的先后顺序）
    pub const PHONE_SOURCES: [&str; 3] = [TELEFONO_CONTACTO, TELEFONO_CABECERA, TELEFONO_3];

    /// 描述性字段（取客户首行）
    pub const DESCRIPTIVE: [&str; 3] = [NOMBRE_EMPRESA, DIRECCION_CLIENTE, EMAIL_FACTURACION];

    /// 每张发票展开的四元组列
    pub const INVOICE_QUADRUPLE: [&str; 4] =
        [FECHA_DEVOLUCION, TOTAL_PENDIENTE, ESTADO_DEUDA, INVOICE_NUMBER];

    /// 带序号的列名, 如 `telefono_1`, `invoiceNumber_3`
    pub fn indexed(base: &str, index: usize) -> String {
        format!("{}_{}", base, index)
    }
}

// ==========================================
// InvoiceRow - 输入发票行
// ==========================================
// 缺失列统一映射为 CellValue::Empty
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRow {
    // ===== 客户键 =====
    pub fiscal_id: CellValue,

    // ===== 描述性字段（假定同一客户恒定）=====
    pub nombre_empresa: CellValue,
    pub direccion_cliente: CellValue,
    pub email_facturacion: CellValue,

    // ===== 候选电话（可能重叠/重复）=====
    pub telefono_contacto: CellValue,
    pub telefono_cabecera: CellValue,
    pub telefono_3: CellValue,

    // ===== 发票明细 =====
    pub fecha_devolucion: CellValue,
    pub total_pendiente: CellValue, // 欠款金额（可能以文本到达）
    pub estado_deuda: CellValue,
    pub invoice_number: CellValue,

    // ===== 元信息 =====
    pub row_number: usize, // 源文件行号（表头为第 1 行）
}

impl InvoiceRow {
    /// 按来源列顺序返回三个候选电话
    pub fn phone_candidates(&self) -> [&CellValue; 3] {
        [
            &self.telefono_contacto,
            &self.telefono_cabecera,
            &self.telefono_3,
        ]
    }
}

// ==========================================
// InvoiceLine - 客户汇总中的单张发票四元组
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub fecha_devolucion: CellValue,
    pub total_pendiente: f64, // 数值强制转换后的金额（失败为 0）
    pub estado_deuda: CellValue,
    pub invoice_number: CellValue,
}

// ==========================================
// CustomerSummary - 客户汇总（宽表一行）
// ==========================================
// 构造后不可变（日期字符串已在分组前格式化）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub fiscal_id: CellValue,
    pub nombre_empresa: CellValue,
    pub direccion_cliente: CellValue,
    pub email_facturacion: CellValue,
    pub suma_pendientes: f64,   // 两位小数
    pub total_facturas: String, // "N factura(s) pendiente(s)"
    pub telefonos: Vec<CellValue>,
    pub facturas: Vec<InvoiceLine>,
}

impl CustomerSummary {
    pub fn invoice_count(&self) -> usize {
        self.facturas.len()
    }

    pub fn phone_count(&self) -> usize {
        self.telefonos.len()
    }
}

/// 西语单复数: "1 factura pendiente" / "N facturas pendientes"
pub fn total_facturas_label(count: usize) -> String {
    if count == 1 {
        "1 factura pendiente".to_string()
    } else {
        format!("{} facturas pendientes", count)
    }
}
