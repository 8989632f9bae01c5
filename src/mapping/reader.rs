use crate::mapping::record::{MappingRecord, MappingSet, REQUIRED_COLUMNS};
use crate::utils::{Result, ValidatorError};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;
use std::path::Path;

/// Parses the first sheet of a workbook (xlsx, xlsm, xlsb, xls or ods).
pub fn read(file_bytes: &[u8]) -> Result<MappingSet> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(file_bytes))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ValidatorError::ParseError("workbook contains no sheets".to_string()))??;

    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| ValidatorError::ParseError("first sheet is empty".to_string()))?;
    let headers: Vec<String> = header_row.iter().map(cell_text).collect();

    let cells = rows.map(|row| row.iter().map(cell_text).collect());
    let set = collect_records(&headers, cells)?;

    tracing::info!(rows = set.len(), "Parsed mapping workbook");
    Ok(set)
}

/// Parses a UTF-8 CSV export of a mapping table.
pub fn read_csv(file_bytes: &[u8]) -> Result<MappingSet> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(file_bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        records.push(record.iter().map(|s| s.to_string()).collect::<Vec<_>>());
    }

    let set = collect_records(&headers, records)?;

    tracing::info!(rows = set.len(), "Parsed mapping CSV");
    Ok(set)
}

/// Picks the parser from the uploaded file's extension.
pub fn read_named(file_name: &str, file_bytes: &[u8]) -> Result<MappingSet> {
    let is_csv = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    if is_csv {
        read_csv(file_bytes)
    } else {
        read(file_bytes)
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn column_positions(headers: &[String]) -> Result<[usize; 5]> {
    let mut positions = [0usize; 5];
    let mut missing = Vec::new();

    for (slot, name) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
        match headers.iter().position(|h| h == name) {
            Some(idx) => *slot = idx,
            None => missing.push(name.to_string()),
        }
    }

    if missing.is_empty() {
        Ok(positions)
    } else {
        Err(ValidatorError::MissingColumns(missing))
    }
}

fn collect_records<I>(headers: &[String], rows: I) -> Result<MappingSet>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let positions = column_positions(headers)?;

    let set = rows
        .into_iter()
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .map(|row| {
            MappingRecord::from_fields(positions.map(|idx| row.get(idx).cloned().unwrap_or_default()))
        })
        .collect();

    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Stage Table,Source Column,Target Table,Target Column,Transformation";

    #[test]
    fn csv_rows_keep_their_order() {
        let data = format!(
            "{HEADER}\norders,id,fact_orders,order_id,passthrough\norders,amt,fact_orders,amount,cast decimal\n"
        );
        let set = read_csv(data.as_bytes()).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.records()[0].source_column, "id");
        assert_eq!(set.records()[1].transformation, "cast decimal");
    }

    #[test]
    fn csv_columns_may_be_reordered_and_padded() {
        let data = "Notes,Transformation,Target Column,Target Table,Source Column,Stage Table\n\
                    n1,upper,name,dim_customer,cust_name,customers\n\
                    n2\n";
        let set = read_csv(data.as_bytes()).unwrap();

        assert_eq!(set.len(), 2);
        let first = &set.records()[0];
        assert_eq!(first.stage_table, "customers");
        assert_eq!(first.transformation, "upper");
        assert_eq!(set.records()[1], MappingRecord::default());
    }

    #[test]
    fn csv_missing_column_lists_it() {
        let data = "Stage Table,Source Column,Target Table,Target Column\na,b,c,d\n";
        let err = read_csv(data.as_bytes()).unwrap_err();
        match err {
            ValidatorError::MissingColumns(cols) => assert_eq!(cols, vec!["Transformation"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn header_match_is_exact() {
        let data = "stage table,Source Column,Target Table,Target Column,Transformation\n";
        let err = read_csv(data.as_bytes()).unwrap_err();
        assert!(matches!(err, ValidatorError::MissingColumns(ref cols) if cols == &["Stage Table"]));
    }

    #[test]
    fn blank_rows_are_dropped() {
        let data = format!("{HEADER}\n,,,,\na,b,c,d,e\n");
        let set = read_csv(data.as_bytes()).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.records()[0].stage_table, "a");
    }

    #[test]
    fn garbage_is_not_a_workbook() {
        let err = read(b"this is not a spreadsheet").unwrap_err();
        assert!(matches!(err, ValidatorError::ParseError(_)));
    }

    #[test]
    fn read_named_dispatches_on_extension() {
        let data = format!("{HEADER}\na,b,c,d,e\n");
        assert_eq!(read_named("mapping.CSV", data.as_bytes()).unwrap().len(), 1);
        assert!(read_named("mapping.xlsx", data.as_bytes()).is_err());
    }
}
