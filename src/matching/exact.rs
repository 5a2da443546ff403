// src/matching/exact.rs
use std::collections::{HashMap, HashSet};

use crate::config::EntityProfile;
use crate::error::ReconcileError;
use crate::matching::normalize::normalize_cell;
use crate::models::{CanonicalEntity, DistinctKey, LocalRecord, RegistryTable, Table, UnmatchedKey};

/// Result of partitioning local records against one country's registry.
#[derive(Debug, Default)]
pub struct ExactSplit {
    /// Distinct keys with an exact registry match, mapped to its identifier.
    pub matched: HashMap<DistinctKey, String>,
    pub matched_rows: usize,
    /// Distinct keys without an exact match, in first-seen order.
    pub unmatched: Vec<UnmatchedKey>,
}

/// Reads the identifying fields of every row, failing on the first row or
/// column that makes the table unusable.
pub fn extract_records(
    table: &Table,
    profile: &EntityProfile,
) -> Result<Vec<LocalRecord>, ReconcileError> {
    if table.is_empty() {
        return Err(ReconcileError::input_shape(format!(
            "{} table has no rows",
            profile.entity_type
        )));
    }
    for column in profile.required_local_columns() {
        if !table.has_column(column) {
            return Err(ReconcileError::input_shape(format!(
                "missing required column '{}' for {} data (found: {})",
                column,
                profile.entity_type,
                table.columns.join(", ")
            )));
        }
    }

    let country_idx = column_position(table, profile.local_country)?;
    let primary_idx = column_position(table, profile.local_primary)?;
    let secondary_idx = match profile.local_secondary {
        Some(name) => Some(column_position(table, name)?),
        None => None,
    };

    let mut records = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        let country = non_blank(table.cell(row, country_idx)).ok_or_else(|| {
            ReconcileError::input_shape(format!(
                "row {}: '{}' is empty",
                row + 1,
                profile.local_country
            ))
        })?;
        let primary = non_blank(table.cell(row, primary_idx)).ok_or_else(|| {
            ReconcileError::input_shape(format!(
                "row {}: '{}' is empty",
                row + 1,
                profile.local_primary
            ))
        })?;
        let secondary_raw = secondary_idx
            .and_then(|idx| non_blank(table.cell(row, idx)))
            .map(str::to_string);

        records.push(LocalRecord {
            row,
            key: DistinctKey::from_raw(country, primary),
            primary_raw: primary.to_string(),
            normalized_secondary: normalize_cell(secondary_raw.as_deref()),
            secondary_raw,
        });
    }
    Ok(records)
}

fn column_position(table: &Table, name: &str) -> Result<usize, ReconcileError> {
    table
        .column_index(name)
        .ok_or_else(|| ReconcileError::input_shape(format!("missing required column '{}'", name)))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Normalized countries of `records`, in first-seen order.
pub fn countries(records: &[LocalRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|r| seen.insert(r.key.country.clone()))
        .map(|r| r.key.country.clone())
        .collect()
}

/// Splits the records of `registry`'s country into exact matches and
/// distinct unmatched keys. Records from other countries are ignored.
pub fn split(records: &[LocalRecord], registry: &RegistryTable) -> ExactSplit {
    // first registry entity wins when several share a normalized name
    let mut by_name: HashMap<&str, &CanonicalEntity> = HashMap::new();
    for entity in &registry.entities {
        by_name
            .entry(entity.normalized_primary.as_str())
            .or_insert(entity);
    }

    let mut result = ExactSplit::default();
    let mut unmatched_positions: HashMap<DistinctKey, usize> = HashMap::new();

    for record in records.iter().filter(|r| r.key.country == registry.country) {
        if let Some(entity) = by_name.get(record.key.name.as_str()) {
            result
                .matched
                .entry(record.key.clone())
                .or_insert_with(|| entity.identifier.clone());
            result.matched_rows += 1;
            continue;
        }

        match unmatched_positions.get(&record.key) {
            Some(&pos) => result.unmatched[pos].occurrences += 1,
            None => {
                unmatched_positions.insert(record.key.clone(), result.unmatched.len());
                result.unmatched.push(UnmatchedKey {
                    key: record.key.clone(),
                    display_name: record.primary_raw.clone(),
                    secondary_raw: record.secondary_raw.clone(),
                    normalized_secondary: record.normalized_secondary.clone(),
                    occurrences: 1,
                });
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::profiles::{COMPANY_PROFILE, PROJECT_PROFILE};
    use crate::models::EntityType;
    use crate::utils::constants::LEGAL_REFERENCE_LABEL;

    fn company_table(rows: &[(&str, &str)]) -> Table {
        let mut table = Table::new(["Country", "Company", "Year"]);
        for (country, company) in rows {
            table.push_strs(&[country, company, "2022"]);
        }
        table
    }

    fn ghana_registry() -> RegistryTable {
        RegistryTable::from_entities(
            EntityType::Company,
            "Ghana",
            vec![
                CanonicalEntity::new("GH-1", "Société Minière", None, "Ghana"),
                CanonicalEntity::new("GH-2", "Golden Star", None, "Ghana"),
                CanonicalEntity::new("GH-3", "GOLDEN STAR", None, "Ghana"),
            ],
        )
    }

    #[test]
    fn test_exact_match_on_normalized_name() {
        let table = company_table(&[("Ghana", "SOCIETE MINIERE"), ("ghana", "société minière")]);
        let records = extract_records(&table, &COMPANY_PROFILE).unwrap();
        let split = split(&records, &ghana_registry());

        assert_eq!(split.matched_rows, 2);
        assert_eq!(split.matched.len(), 1);
        assert_eq!(
            split.matched.get(&DistinctKey::from_raw("Ghana", "Société Minière")),
            Some(&"GH-1".to_string())
        );
        assert!(split.unmatched.is_empty());
    }

    #[test]
    fn test_first_registry_entity_wins_on_duplicate_names() {
        let table = company_table(&[("Ghana", "Golden Star")]);
        let records = extract_records(&table, &COMPANY_PROFILE).unwrap();
        let split = split(&records, &ghana_registry());
        assert_eq!(split.matched.values().next().unwrap(), "GH-2");
    }

    #[test]
    fn test_unmatched_collapsed_to_distinct_keys() {
        let table = company_table(&[
            ("Ghana", "Acme Corp"),
            ("Ghana", "Beta Mining"),
            ("Ghana", "ACME CORP"),
        ]);
        let records = extract_records(&table, &COMPANY_PROFILE).unwrap();
        let split = split(&records, &ghana_registry());

        assert_eq!(split.matched_rows, 0);
        assert_eq!(split.unmatched.len(), 2);
        assert_eq!(split.unmatched[0].display_name, "Acme Corp");
        assert_eq!(split.unmatched[0].occurrences, 2);
        assert_eq!(split.unmatched[1].key.name, "BETA MINING");
    }

    #[test]
    fn test_other_countries_ignored() {
        let table = company_table(&[("Nigeria", "Golden Star")]);
        let records = extract_records(&table, &COMPANY_PROFILE).unwrap();
        let split = split(&records, &ghana_registry());
        assert!(split.matched.is_empty());
        assert!(split.unmatched.is_empty());
    }

    #[test]
    fn test_countries_in_first_seen_order() {
        let table = company_table(&[("Ghana", "A"), ("Nigeria", "B"), ("GHANA", "C")]);
        let records = extract_records(&table, &COMPANY_PROFILE).unwrap();
        assert_eq!(countries(&records), vec!["GHANA", "NIGERIA"]);
    }

    #[test]
    fn test_empty_table_rejected() {
        let table = Table::new(["Country", "Company"]);
        let err = extract_records(&table, &COMPANY_PROFILE).unwrap_err();
        assert!(matches!(err, ReconcileError::InputShape { .. }));
    }

    #[test]
    fn test_missing_column_rejected() {
        let mut table = Table::new(["Country", "Name"]);
        table.push_strs(&["Ghana", "Acme"]);
        let err = extract_records(&table, &COMPANY_PROFILE).unwrap_err();
        assert!(err.to_string().contains("missing required column 'Company'"));
    }

    #[test]
    fn test_blank_country_rejected_with_row() {
        let table = company_table(&[("Ghana", "Acme"), ("  ", "Beta")]);
        let err = extract_records(&table, &COMPANY_PROFILE).unwrap_err();
        assert!(err.to_string().contains("row 2: 'Country' is empty"));
    }

    #[test]
    fn test_project_secondary_is_normalized() {
        let mut table = Table::new(["Country", "Full project name", LEGAL_REFERENCE_LABEL]);
        table.push_strs(&["Ghana", "Tarkwa", "lic-2021-004"]);
        table.push_strs(&["Ghana", "Damang", ""]);
        let records = extract_records(&table, &PROJECT_PROFILE).unwrap();
        assert_eq!(records[0].normalized_secondary.as_deref(), Some("LIC-2021-004"));
        assert_eq!(records[0].secondary_raw.as_deref(), Some("lic-2021-004"));
        assert_eq!(records[1].normalized_secondary, None);
    }
}
