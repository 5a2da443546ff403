// src/tables/input.rs
use anyhow::{Context, Result};
use log::info;
use std::path::Path;

use super::csv_table::{read_table, read_table_from_path};
use super::sheets::google_sheet_csv_url;
use crate::models::Table;

pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Loads the local summary table from a CSV path, a CSV URL or a Google
/// Sheets link.
pub async fn load_input(source: &str, client: &reqwest::Client) -> Result<Table> {
    let table = if is_remote(source) {
        let url = google_sheet_csv_url(source).unwrap_or_else(|| source.to_string());
        info!("🌐 Downloading input table from {}", url);
        let body = client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to request {}", url))?
            .error_for_status()
            .with_context(|| format!("Input download from {} was rejected", url))?
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))?;
        read_table(body.as_bytes()).with_context(|| format!("Failed to parse CSV from {}", url))?
    } else {
        info!("📂 Reading input table from {}", source);
        read_table_from_path(Path::new(source))?
    };

    info!(
        "📋 Input table: {} rows, {} columns",
        table.len(),
        table.columns.len()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://docs.google.com/spreadsheets/d/x/edit"));
        assert!(!is_remote("./data/companies.csv"));
    }

    #[tokio::test]
    async fn test_load_local_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Country,Company").unwrap();
        writeln!(file, "Ghana,Acme").unwrap();

        let client = reqwest::Client::new();
        let table = load_input(file.path().to_str().unwrap(), &client).await.unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.cell(0, 1), Some("Acme"));
    }
}
