// src/matching/merge.rs
use std::collections::HashMap;

use crate::config::EntityProfile;
use crate::error::ReconcileError;
use crate::models::{Cell, DistinctKey, LocalRecord, MatchOutcome, Table};

/// Writes the resolved identifier onto every row of `table` and shapes the
/// result for output. Refuses to produce anything if a row is unresolved.
pub fn merge(
    table: &Table,
    records: &[LocalRecord],
    outcomes: &HashMap<DistinctKey, MatchOutcome>,
    profile: &EntityProfile,
) -> Result<Table, ReconcileError> {
    if records.len() != table.len() {
        return Err(ReconcileError::input_shape(format!(
            "{} records extracted for a table of {} rows",
            records.len(),
            table.len()
        )));
    }

    let mut identifiers: Vec<Cell> = vec![None; table.len()];
    for record in records {
        let outcome = outcomes
            .get(&record.key)
            .ok_or_else(|| ReconcileError::Unresolved {
                row: record.row + 1,
                key: record.key.clone(),
            })?;
        identifiers[record.row] = Some(outcome.identifier().to_string());
    }

    let mut merged = table.clone();
    merged.set_column(profile.output_identifier, identifiers);

    for (from, to) in profile.renames {
        merged.rename_column(from, to);
    }

    Ok(match &profile.output_schema {
        Some(schema) => merged.project(&schema.column_names(), |name| {
            schema.field(name).and_then(|f| f.kind.default_value())
        }),
        None => merged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::profiles::{COMPANY_PROFILE, PROJECT_PROFILE};
    use crate::matching::exact::extract_records;
    use crate::utils::constants::LEGAL_REFERENCE_LABEL;

    fn outcomes(pairs: &[(&str, MatchOutcome)]) -> HashMap<DistinctKey, MatchOutcome> {
        pairs
            .iter()
            .map(|(name, outcome)| (DistinctKey::from_raw("Ghana", name), outcome.clone()))
            .collect()
    }

    #[test]
    fn test_identifier_appended_and_values_untouched() {
        let mut table = Table::new(["Country", "Company", "Revenue"]);
        table.push_strs(&["Ghana", "Société Minière", "100"]);
        table.push_strs(&["Ghana", "Acme Corp", "5"]);
        table.push_strs(&["Ghana", "ACME CORP", "7"]);
        let records = extract_records(&table, &COMPANY_PROFILE).unwrap();
        let map = outcomes(&[
            ("Societe Miniere", MatchOutcome::ExactMatch("GH-1".into())),
            ("Acme Corp", MatchOutcome::NoMatch("new-1".into())),
        ]);

        let merged = merge(&table, &records, &map, &COMPANY_PROFILE).unwrap();

        assert_eq!(merged.columns, vec!["Country", "Company", "Revenue", "eiti_id_company"]);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.cell(0, 1), Some("Société Minière"));
        assert_eq!(merged.cell(0, 3), Some("GH-1"));
        assert_eq!(merged.cell(1, 3), Some("new-1"));
        assert_eq!(merged.cell(2, 3), Some("new-1"));
    }

    #[test]
    fn test_existing_identifier_column_overwritten() {
        let mut table = Table::new(["eiti_id_company", "Country", "Company"]);
        table.push_strs(&["stale", "Ghana", "Acme"]);
        let records = extract_records(&table, &COMPANY_PROFILE).unwrap();
        let map = outcomes(&[("Acme", MatchOutcome::FuzzyConfirmed("GH-9".into()))]);

        let merged = merge(&table, &records, &map, &COMPANY_PROFILE).unwrap();
        assert_eq!(merged.columns.len(), 3);
        assert_eq!(merged.cell(0, 0), Some("GH-9"));
    }

    #[test]
    fn test_unresolved_row_refuses_merge() {
        let mut table = Table::new(["Country", "Company"]);
        table.push_strs(&["Ghana", "Acme"]);
        table.push_strs(&["Ghana", "Beta"]);
        let records = extract_records(&table, &COMPANY_PROFILE).unwrap();
        let map = outcomes(&[("Acme", MatchOutcome::ExactMatch("GH-1".into()))]);

        let err = merge(&table, &records, &map, &COMPANY_PROFILE).unwrap_err();
        match err {
            ReconcileError::Unresolved { row, key } => {
                assert_eq!(row, 2);
                assert_eq!(key.name, "BETA");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_project_schema_applied() {
        let mut table = Table::new([
            "Country",
            "Full project name",
            LEGAL_REFERENCE_LABEL,
            "ISO Code",
            "Commodities",
            "year",
        ]);
        table.push_strs(&["Ghana", "Tarkwa", "LIC-2021-004", "GHA", "Gold", "2022"]);
        let records = extract_records(&table, &PROJECT_PROFILE).unwrap();
        let map = outcomes(&[("Tarkwa", MatchOutcome::FuzzyConfirmed("P-2".into()))]);

        let merged = merge(&table, &records, &map, &PROJECT_PROFILE).unwrap();

        assert_eq!(
            merged.columns,
            vec![
                "rowid",
                "project_name",
                "eiti_id_project",
                "legal_agreement_reference",
                "affiliated_companies",
                "commodities",
                "status",
                "production_volume",
                "unit",
                "production_value",
                "currency",
                "country",
                "iso_alpha3_code",
                "eiti_id_declaration",
                "year",
                "start_date",
                "end_date",
            ]
        );
        let row = &merged.rows[0];
        assert_eq!(row[0], None);
        assert_eq!(row[1].as_deref(), Some("Tarkwa"));
        assert_eq!(row[2].as_deref(), Some("P-2"));
        assert_eq!(row[3].as_deref(), Some("LIC-2021-004"));
        assert_eq!(row[4].as_deref(), Some("n/a"));
        // "Commodities" is not a recognised source column, so the default applies
        assert_eq!(row[5].as_deref(), Some("n/a"));
        assert_eq!(row[7].as_deref(), Some(""));
        assert_eq!(row[11].as_deref(), Some("Ghana"));
        assert_eq!(row[12].as_deref(), Some("GHA"));
        assert_eq!(row[14].as_deref(), Some("2022"));
        assert_eq!(row[15].as_deref(), Some(""));
    }
}
