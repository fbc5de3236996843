#![forbid(unsafe_code)]

use super::{SqliteStore, StoreError};
use mims_core::taxonomy::{TaxonomyLevel, normalize_choice};
use rusqlite::params;

impl SqliteStore {
    /// Distinct active values stored at `level`, ascending.
    ///
    /// The top level ignores `parent`. Every other level only returns rows whose
    /// immediate parent column equals `parent`; a missing or blank parent yields
    /// an empty list without touching the database.
    pub fn taxonomy_values(
        &self,
        level: TaxonomyLevel,
        parent: Option<&str>,
    ) -> Result<Vec<String>, StoreError> {
        let column = level.column();

        let Some(parent_column) = level.parent_column() else {
            let sql = format!(
                "SELECT DISTINCT {column} FROM incident_types \
                 WHERE active = 'Y' AND TRIM({column}) <> '' \
                 ORDER BY {column} COLLATE NOCASE ASC, {column} ASC"
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            return Ok(rows.collect::<Result<Vec<_>, _>>()?);
        };

        let Some(parent) = parent.and_then(normalize_choice) else {
            return Ok(Vec::new());
        };

        let sql = format!(
            "SELECT DISTINCT {column} FROM incident_types \
             WHERE active = 'Y' AND {parent_column} = ?1 AND TRIM({column}) <> '' \
             ORDER BY {column} COLLATE NOCASE ASC, {column} ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![parent], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn top_categories(&self) -> Result<Vec<String>, StoreError> {
        self.taxonomy_values(TaxonomyLevel::Category, None)
    }

    /// Values at subcategory `depth` (1..=3) under the selected parent value.
    pub fn subcategories(&self, depth: u8, parent: &str) -> Result<Vec<String>, StoreError> {
        let level = TaxonomyLevel::from_depth(depth)
            .map_err(|err| StoreError::InvalidInput(err.message()))?;
        self.taxonomy_values(level, Some(parent))
    }

    /// Children of a value selected at `level`; the deepest level has none.
    pub fn taxonomy_children(
        &self,
        level: TaxonomyLevel,
        selected: &str,
    ) -> Result<Vec<String>, StoreError> {
        match level.child() {
            Some(child) => self.taxonomy_values(child, Some(selected)),
            None => Ok(Vec::new()),
        }
    }
}
