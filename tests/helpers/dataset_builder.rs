// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

#![allow(dead_code)]

use recobro_facturas::domain::table::{CellValue, Table};
use std::io::Write;
use std::path::{Path, PathBuf};

/// 标准输入列（与导出前的发票明细一致）
pub const STANDARD_COLUMNS: [&str; 11] = [
    "fiscalId",
    "nombre_empresa",
    "direccionCliente",
    "emailFacturacion",
    "telefonoContacto",
    "telefonoCabecera",
    "telefono3",
    "fechaDevolucion",
    "totalPendiente",
    "Estado_deuda",
    "invoiceNumber",
];

// ==========================================
// InvoiceBuilder - 单行发票构建器
// ==========================================

#[derive(Debug, Clone, Default)]
pub struct InvoiceBuilder {
    fiscal_id: String,
    nombre_empresa: String,
    direccion_cliente: String,
    email_facturacion: String,
    telefonos: [String; 3],
    fecha_devolucion: String,
    total_pendiente: String,
    estado_deuda: String,
    invoice_number: String,
}

impl InvoiceBuilder {
    pub fn new(fiscal_id: &str) -> Self {
        Self {
            fiscal_id: fiscal_id.to_string(),
            ..Self::default()
        }
    }

    pub fn nombre(mut self, nombre: &str) -> Self {
        self.nombre_empresa = nombre.to_string();
        self
    }

    pub fn direccion(mut self, direccion: &str) -> Self {
        self.direccion_cliente = direccion.to_string();
        self
    }

    pub fn email(mut self, email: &str) -> Self {
        self.email_facturacion = email.to_string();
        self
    }

    pub fn telefonos(mut self, contacto: &str, cabecera: &str, tercero: &str) -> Self {
        self.telefonos = [
            contacto.to_string(),
            cabecera.to_string(),
            tercero.to_string(),
        ];
        self
    }

    pub fn fecha(mut self, fecha: &str) -> Self {
        self.fecha_devolucion = fecha.to_string();
        self
    }

    pub fn total(mut self, total: &str) -> Self {
        self.total_pendiente = total.to_string();
        self
    }

    pub fn estado(mut self, estado: &str) -> Self {
        self.estado_deuda = estado.to_string();
        self
    }

    pub fn factura(mut self, numero: &str) -> Self {
        self.invoice_number = numero.to_string();
        self
    }

    /// 按 STANDARD_COLUMNS 顺序输出字段
    pub fn fields(&self) -> Vec<String> {
        vec![
            self.fiscal_id.clone(),
            self.nombre_empresa.clone(),
            self.direccion_cliente.clone(),
            self.email_facturacion.clone(),
            self.telefonos[0].clone(),
            self.telefonos[1].clone(),
            self.telefonos[2].clone(),
            self.fecha_devolucion.clone(),
            self.total_pendiente.clone(),
            self.estado_deuda.clone(),
            self.invoice_number.clone(),
        ]
    }
}

// ==========================================
// DatasetBuilder - 数据集构建器
// ==========================================

#[derive(Debug, Clone)]
pub struct DatasetBuilder {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl DatasetBuilder {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn standard() -> Self {
        Self::new(&STANDARD_COLUMNS)
    }

    pub fn row(mut self, values: &[&str]) -> Self {
        self.rows.push(values.iter().map(|v| v.to_string()).collect());
        self
    }

    pub fn invoice(mut self, invoice: InvoiceBuilder) -> Self {
        self.rows.push(invoice.fields());
        self
    }

    /// 空字符串 → Empty, 其余 → Text（与 CSV 解析结果一致）
    pub fn to_table(&self) -> Table {
        Table::with_rows(
            self.columns.clone(),
            self.rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|v| {
                            if v.is_empty() {
                                CellValue::Empty
                            } else {
                                CellValue::text(v.as_str())
                            }
                        })
                        .collect()
                })
                .collect(),
        )
    }

    pub fn to_csv(&self) -> String {
        let mut out = self.columns.join(";");
        out.push('\n');
        for row in &self.rows {
            out.push_str(&row.join(";"));
            out.push('\n');
        }
        out
    }

    /// 写入目录下的 CSV 文件
    pub fn write_csv(&self, dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        let mut file = std::fs::File::create(&path).expect("创建测试文件失败");
        file.write_all(self.to_csv().as_bytes())
            .expect("写入测试文件失败");
        path
    }
}

/// 测试数据集目录下的文件
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("datasets")
        .join(name)
}
