// ==========================================
// 发票催收汇总系统 - 宽表导出器
// ==========================================
// 输出: UTF-8 文本表, 含表头, 默认 `;` 分隔
// 单元格按 CellValue::render 渲染, Empty → 空字段
// ==========================================

use crate::domain::table::Table;
use crate::exporter::error::ExportResult;
use crate::importer::file_parser::DEFAULT_CSV_DELIMITER;
use csv::WriterBuilder;
use std::io::Write;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone)]
pub struct CsvExporter {
    delimiter: u8,
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self::new(DEFAULT_CSV_DELIMITER)
    }
}

impl CsvExporter {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// 写入文件（已存在则覆盖）
    pub fn write_to_path(&self, table: &Table, path: &Path) -> ExportResult<()> {
        let file = std::fs::File::create(path)?;
        self.write_to(table, file)?;
        info!(
            path = %path.display(),
            rows = table.len(),
            columns = table.columns().len(),
            "宽表已导出"
        );
        Ok(())
    }

    /// 写入任意输出流
    pub fn write_to<W: Write>(&self, table: &Table, writer: W) -> ExportResult<()> {
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(writer);

        writer.write_record(table.columns())?;
        for row in table.rows() {
            writer.write_record(row.iter().map(|cell| cell.render()))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// 渲染为字符串
    pub fn render(&self, table: &Table) -> ExportResult<String> {
        let mut buffer = Vec::new();
        self.write_to(table, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::CellValue;

    #[test]
    fn test_export_renders_cells() {
        let table = Table::with_rows(
            vec!["fiscalId".to_string(), "Suma_Pendientes".to_string(), "telefono_1".to_string()],
            vec![
                vec![CellValue::text("A1"), CellValue::Number(50.0), CellValue::Empty],
                vec![CellValue::text("B;2"), CellValue::Number(30.25), CellValue::text("600")],
            ],
        );

        let out = CsvExporter::default().render(&table).unwrap();

        assert_eq!(
            out,
            "fiscalId;Suma_Pendientes;telefono_1\nA1;50;\n\"B;2\";30.25;600\n"
        );
    }

    #[test]
    fn test_export_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("salida.csv");
        let table = Table::with_rows(vec!["fiscalId".to_string()], vec![vec![CellValue::text("Ñandú")]]);

        CsvExporter::new(b',').write_to_path(&table, &path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fiscalId\nÑandú\n");
    }
}
