// src/models/core.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::profiles::{self, EntityProfile};
use crate::matching::normalize::{normalize, normalize_country, normalize_key};

/// A single table cell. `None` is an absent value (an empty CSV field).
pub type Cell = Option<String>;

/// The three kinds of entity reported in summary data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Company,
    Government,
    Project,
}

impl EntityType {
    pub const ALL: [EntityType; 3] = [EntityType::Company, EntityType::Government, EntityType::Project];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Company => "company",
            EntityType::Government => "government",
            EntityType::Project => "project",
        }
    }

    pub fn profile(&self) -> &'static EntityProfile {
        profiles::profile_for(*self)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "company" | "companies" => Ok(EntityType::Company),
            "government" | "governments" | "agency" | "agencies" => Ok(EntityType::Government),
            "project" | "projects" => Ok(EntityType::Project),
            other => Err(format!(
                "unknown entity type '{}' (expected company, government or project)",
                other
            )),
        }
    }
}

/// Row-oriented table with named columns, used for both the local
/// submission and the raw registry download.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row, padding short rows with absent cells and dropping
    /// anything past the last column.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    /// Convenience for building tables from string literals in tests and fixtures.
    pub fn push_strs(&mut self, row: &[&str]) {
        self.push_row(
            row.iter()
                .map(|v| if v.is_empty() { None } else { Some(v.to_string()) })
                .collect(),
        );
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .and_then(|c| c.as_deref())
    }

    /// Writes `values` into `name`, overwriting the column in place when it
    /// already exists and appending it otherwise.
    pub fn set_column(&mut self, name: &str, values: Vec<Cell>) {
        debug_assert_eq!(values.len(), self.rows.len());
        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }

    /// Renames a column. A no-op when `from` is missing or `to` already exists.
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        if from == to || self.has_column(to) {
            return false;
        }
        match self.column_index(from) {
            Some(idx) => {
                self.columns[idx] = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Returns a copy restricted to `columns`, in that order. Missing
    /// columns are filled by `fill`.
    pub fn project<F>(&self, columns: &[&str], mut fill: F) -> Table
    where
        F: FnMut(&str) -> Cell,
    {
        let indices: Vec<Option<usize>> = columns.iter().map(|c| self.column_index(c)).collect();
        let defaults: Vec<Cell> = columns
            .iter()
            .zip(&indices)
            .map(|(name, idx)| if idx.is_none() { fill(name) } else { None })
            .collect();

        let mut out = Table::new(columns.iter().copied());
        for row in &self.rows {
            let projected = indices
                .iter()
                .zip(&defaults)
                .map(|(idx, default)| match idx {
                    Some(i) => row[*i].clone(),
                    None => default.clone(),
                })
                .collect();
            out.rows.push(projected);
        }
        out
    }
}

/// One registry entity, scoped to a country. Normalized forms are computed
/// once at construction so comparisons never touch raw text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalEntity {
    pub identifier: String,
    pub primary: String,
    pub secondary: Option<String>,
    pub country: String,
    #[serde(skip)]
    pub normalized_primary: String,
    #[serde(skip)]
    pub normalized_secondary: Option<String>,
}

impl CanonicalEntity {
    pub fn new(
        identifier: impl Into<String>,
        primary: impl Into<String>,
        secondary: Option<String>,
        country: impl Into<String>,
    ) -> Self {
        let primary = primary.into();
        let secondary = secondary.filter(|s| !s.trim().is_empty());
        Self {
            identifier: identifier.into(),
            normalized_primary: normalize_key(&primary),
            normalized_secondary: secondary.as_deref().map(normalize),
            primary,
            secondary,
            country: country.into(),
        }
    }
}

/// The deduplicated registry slice for one (entity type, country) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryTable {
    pub entity_type: EntityType,
    /// Normalized country the table was filtered on.
    pub country: String,
    pub entities: Vec<CanonicalEntity>,
}

impl RegistryTable {
    /// Builds a table from raw entities, keeping only rows for `country`
    /// (case-insensitive) and the first row seen for each identifier.
    pub fn from_entities(
        entity_type: EntityType,
        country: &str,
        entities: impl IntoIterator<Item = CanonicalEntity>,
    ) -> Self {
        let country = normalize_country(country);
        let mut seen = std::collections::HashSet::new();
        let entities = entities
            .into_iter()
            .filter(|e| normalize_country(&e.country) == country)
            .filter(|e| seen.insert(e.identifier.clone()))
            .collect();
        Self {
            entity_type,
            country,
            entities,
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn by_identifier(&self, identifier: &str) -> Option<&CanonicalEntity> {
        self.entities.iter().find(|e| e.identifier == identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_type_parsing() {
        assert_eq!("Company".parse::<EntityType>().unwrap(), EntityType::Company);
        assert_eq!("agencies".parse::<EntityType>().unwrap(), EntityType::Government);
        assert_eq!(" projects ".parse::<EntityType>().unwrap(), EntityType::Project);
        assert!("mine".parse::<EntityType>().is_err());
    }

    #[test]
    fn test_set_column_overwrites_or_appends() {
        let mut table = Table::new(["Company", "Year"]);
        table.push_strs(&["Acme", "2021"]);
        table.push_strs(&["Beta", "2022"]);

        table.set_column("eiti_id_company", vec![Some("a".into()), Some("b".into())]);
        assert_eq!(table.columns, vec!["Company", "Year", "eiti_id_company"]);

        table.set_column("Year", vec![None, Some("2023".into())]);
        assert_eq!(table.columns.len(), 3);
        assert_eq!(table.cell(0, 1), None);
        assert_eq!(table.cell(1, 1), Some("2023"));
    }

    #[test]
    fn test_push_row_pads_short_rows() {
        let mut table = Table::new(["a", "b", "c"]);
        table.push_row(vec![Some("1".into())]);
        assert_eq!(table.rows[0], vec![Some("1".to_string()), None, None]);
    }

    #[test]
    fn test_project_fills_missing_columns() {
        let mut table = Table::new(["x", "y"]);
        table.push_strs(&["1", "2"]);
        let projected = table.project(&["y", "z"], |_| Some("n/a".into()));
        assert_eq!(projected.columns, vec!["y", "z"]);
        assert_eq!(projected.rows[0], vec![Some("2".to_string()), Some("n/a".to_string())]);
    }

    #[test]
    fn test_registry_table_filters_country_and_dedupes() {
        let table = RegistryTable::from_entities(
            EntityType::Company,
            "ghana",
            vec![
                CanonicalEntity::new("GH-1", "Acme", None, "Ghana"),
                CanonicalEntity::new("GH-1", "Acme Ltd", None, "GHANA"),
                CanonicalEntity::new("GH-2", "Beta", None, "ghana"),
                CanonicalEntity::new("NG-1", "Acme", None, "Nigeria"),
            ],
        );
        assert_eq!(table.country, "GHANA");
        assert_eq!(table.len(), 2);
        assert_eq!(table.entities[0].primary, "Acme");
        assert_eq!(table.entities[1].identifier, "GH-2");
    }

    #[test]
    fn test_canonical_entity_drops_blank_secondary() {
        let entity = CanonicalEntity::new("P-1", "Tarkwa", Some("   ".into()), "Ghana");
        assert!(entity.secondary.is_none());
        assert!(entity.normalized_secondary.is_none());
    }
}
