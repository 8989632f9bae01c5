use crate::utils::Result;
use rust_xlsxwriter::{Format, Workbook};

pub const SHEET_NAME: &str = "Validation SQL";
pub const COLUMN_HEADER: &str = "Generated SQL";
pub const FILE_NAME: &str = "validation_sql.xlsx";
pub const MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Writes the generated text into a one-cell workbook held in memory.
pub fn export(text: &str) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let body = Format::new().set_text_wrap();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;
    worksheet.set_column_width(0, 100)?;
    worksheet.write_string_with_format(0, 0, COLUMN_HEADER, &header)?;
    worksheet.write_string_with_format(1, 0, text, &body)?;

    let bytes = workbook.save_to_buffer()?;
    tracing::debug!(bytes = bytes.len(), "Exported generated SQL workbook");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ValidatorError;
    use calamine::{open_workbook_auto_from_rs, Data, Reader};
    use std::io::Cursor;

    fn sheet_rows(bytes: Vec<u8>) -> (Vec<String>, Vec<Vec<String>>) {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).unwrap();
        let names = workbook.sheet_names();
        let range = workbook.worksheet_range(SHEET_NAME).unwrap();
        let rows = range
            .rows()
            .map(|row| {
                row.iter()
                    .map(|c| match c {
                        Data::Empty => String::new(),
                        other => other.to_string(),
                    })
                    .collect()
            })
            .collect();
        (names, rows)
    }

    #[test]
    fn multi_statement_text_stays_in_one_cell() {
        let sql = "SELECT COUNT(*) FROM orders;\nSELECT COUNT(*) FROM fact_orders;";
        let (names, rows) = sheet_rows(export(sql).unwrap());

        assert_eq!(names, vec![SHEET_NAME.to_string()]);
        assert_eq!(
            rows,
            vec![vec![COLUMN_HEADER.to_string()], vec![sql.to_string()]]
        );
    }

    #[test]
    fn oversized_text_is_an_export_error() {
        let text = "x".repeat(40_000);
        let err = export(&text).unwrap_err();
        assert!(matches!(err, ValidatorError::ExportError(_)));
    }
}
