// src/tables/csv_table.rs
use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::models::{Cell, Table};

/// Parses CSV with a header row. Empty fields become absent cells; short
/// rows are padded. A row with more fields than the header fails the parse,
/// since its values can no longer be assigned to columns.
pub fn read_table<R: Read>(reader: R) -> Result<Table, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut table = Table::new(columns);
    for (idx, record) in rdr.records().enumerate() {
        let record = record?;
        if record.len() > table.columns.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "row {} has {} fields but the header has {} columns",
                    idx + 1,
                    record.len(),
                    table.columns.len()
                ),
            )
            .into());
        }
        let row: Vec<Cell> = record
            .iter()
            .map(|v| if v.is_empty() { None } else { Some(v.to_string()) })
            .collect();
        table.push_row(row);
    }
    Ok(table)
}

pub fn read_table_from_path(path: &Path) -> Result<Table> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    read_table(file).with_context(|| format!("Failed to parse CSV from {}", path.display()))
}

/// Writes the header and every row; absent cells are written as empty fields.
pub fn write_table<W: Write>(table: &Table, writer: W) -> Result<(), csv::Error> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(&table.columns)?;
    for row in &table.rows {
        wtr.write_record(row.iter().map(|c| c.as_deref().unwrap_or("")))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_table_to_path(table: &Table, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_table(table, file).with_context(|| format!("Failed to write CSV to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_table_absent_cells() {
        let csv = "\u{feff}Country, Company ,Year\nGhana,\"Acme, Ltd\",2022\nGhana,,\nNigeria\n";
        let table = read_table(csv.as_bytes()).unwrap();

        assert_eq!(table.columns, vec!["Country", "Company", "Year"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.cell(0, 1), Some("Acme, Ltd"));
        assert_eq!(table.cell(1, 1), None);
        assert_eq!(table.rows[2], vec![Some("Nigeria".to_string()), None, None]);
    }

    #[test]
    fn test_overlong_row_is_rejected() {
        let csv = "Country,Company,Year\nGhana,Acme Mining,2021\nGhana,Acme, Ltd,2022\n";
        let err = read_table(csv.as_bytes()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("row 2 has 4 fields"), "{}", message);
        assert!(message.contains("3 columns"), "{}", message);
    }

    #[test]
    fn test_overlong_row_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.csv");
        std::fs::write(&path, "Country,Company\nGhana,Acme,Ltd\n").unwrap();

        let err = read_table_from_path(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("row 1 has 3 fields"));
        assert!(err.to_string().contains("input.csv"));
    }

    #[test]
    fn test_write_then_read_file() {
        let mut table = Table::new(["Company", "eiti_id_company"]);
        table.push_strs(&["Société Minière", "GH-1"]);
        table.push_row(vec![Some("Acme".into()), None]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_table_to_path(&table, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "Company,eiti_id_company\nSociété Minière,GH-1\nAcme,\n");
        assert_eq!(read_table_from_path(&path).unwrap(), table);
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = read_table_from_path(Path::new("/nonexistent/input.csv")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/input.csv"));
    }
}
