#![forbid(unsafe_code)]

use super::{FacilityRow, InvestigatorDetails, InvestigatorRow, SqliteStore, StoreError};
use mims_core::model::WARD_DEPARTMENT_KIND;
use mims_core::taxonomy::normalize_choice;
use rusqlite::{Connection, OptionalExtension, params};

impl SqliteStore {
    pub fn active_facilities(&self) -> Result<Vec<FacilityRow>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT facility_id, name
            FROM facilities
            WHERE active = 'Y'
            ORDER BY facility_id ASC
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(FacilityRow {
                facility_id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn facility_abbreviation(&self, facility_id: &str) -> Result<Option<String>, StoreError> {
        facility_abbreviation(&self.conn, facility_id)
    }

    pub fn ward_departments(&self, facility_id: &str) -> Result<Vec<String>, StoreError> {
        let Some(facility_id) = normalize_choice(facility_id) else {
            return Ok(Vec::new());
        };
        let mut stmt = self.conn.prepare(
            r#"
            SELECT name
            FROM departments
            WHERE kind = ?1 AND facility_id = ?2
            ORDER BY name ASC
            "#,
        )?;
        let rows = stmt.query_map(params![WARD_DEPARTMENT_KIND, facility_id], |row| {
            row.get::<_, String>(0)
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn investigators(&self, facility_id: &str) -> Result<Vec<InvestigatorRow>, StoreError> {
        let Some(facility_id) = normalize_choice(facility_id) else {
            return Ok(Vec::new());
        };
        let mut stmt = self.conn.prepare(
            r#"
            SELECT login_name, first_name, surname
            FROM staff
            WHERE facility_id = ?1 AND active = 'Y'
            ORDER BY first_name ASC, surname ASC
            "#,
        )?;
        let rows = stmt.query_map(params![facility_id], |row| {
            let first_name = row.get::<_, String>(1)?;
            let surname = row.get::<_, String>(2)?;
            Ok(InvestigatorRow {
                login_name: row.get(0)?,
                display_name: format!("{first_name} {surname}"),
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn investigator_details(
        &self,
        login_name: &str,
    ) -> Result<Option<InvestigatorDetails>, StoreError> {
        let Some(login_name) = normalize_choice(login_name) else {
            return Ok(None);
        };
        Ok(self
            .conn
            .query_row(
                r#"
                SELECT first_name, surname, email
                FROM staff
                WHERE login_name = ?1 AND active = 'Y'
                "#,
                params![login_name],
                |row| {
                    Ok(InvestigatorDetails {
                        first_name: row.get(0)?,
                        surname: row.get(1)?,
                        email: row.get(2)?,
                    })
                },
            )
            .optional()?)
    }

    pub fn employee_departments(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT DISTINCT department
            FROM employee_categories
            WHERE active = 'Y'
            ORDER BY department ASC
            "#,
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn employee_categories(&self, department: &str) -> Result<Vec<String>, StoreError> {
        let Some(department) = normalize_choice(department) else {
            return Ok(Vec::new());
        };
        let mut stmt = self.conn.prepare(
            r#"
            SELECT category
            FROM employee_categories
            WHERE department = ?1 AND active = 'Y'
            ORDER BY category ASC
            "#,
        )?;
        let rows = stmt.query_map(params![department], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

/// Blank abbreviations read as missing.
pub(crate) fn facility_abbreviation(
    conn: &Connection,
    facility_id: &str,
) -> Result<Option<String>, StoreError> {
    let Some(facility_id) = normalize_choice(facility_id) else {
        return Ok(None);
    };
    let value = conn
        .query_row(
            "SELECT abbreviation FROM facilities WHERE facility_id = ?1",
            params![facility_id],
            |row| row.get::<_, Option<String>>(0),
        )
        .optional()?
        .flatten();
    Ok(value.and_then(|abbr| normalize_choice(&abbr).map(str::to_string)))
}
