#![forbid(unsafe_code)]

use super::{SqliteStore, StoreError, clean};
use mims_core::ids::{FacilityId, LoginName};
use mims_core::model::{ActiveFlag, WARD_DEPARTMENT_KIND};
use rusqlite::{Transaction, params};
use serde::Deserialize;
use std::path::Path;

/// Reference data loaded into the lookup tables.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedDocument {
    pub facilities: Vec<FacilitySeed>,
    pub departments: Vec<DepartmentSeed>,
    pub staff: Vec<StaffSeed>,
    pub employee_categories: Vec<EmployeeCategorySeed>,
    pub incident_types: Vec<IncidentTypeSeed>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FacilitySeed {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub abbreviation: Option<String>,
    #[serde(default = "active_default")]
    pub active: bool,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DepartmentSeed {
    pub facility_id: String,
    pub name: String,
    #[serde(default = "ward_kind")]
    pub kind: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaffSeed {
    pub login_name: String,
    pub first_name: String,
    pub surname: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub facility_id: Option<String>,
    #[serde(default = "active_default")]
    pub active: bool,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmployeeCategorySeed {
    pub department: String,
    pub category: String,
    #[serde(default = "active_default")]
    pub active: bool,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IncidentTypeSeed {
    pub category: String,
    #[serde(default)]
    pub subcategory1: Option<String>,
    #[serde(default)]
    pub subcategory2: Option<String>,
    #[serde(default)]
    pub subcategory3: Option<String>,
    #[serde(default = "active_default")]
    pub active: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub facilities: usize,
    pub departments: usize,
    pub staff: usize,
    pub employee_categories: usize,
    pub incident_types: usize,
}

fn active_default() -> bool {
    true
}

fn ward_kind() -> String {
    WARD_DEPARTMENT_KIND.to_string()
}

impl SeedDocument {
    pub fn from_yaml_str(raw: &str) -> Result<Self, StoreError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }
}

impl SqliteStore {
    /// Upserts every row of `seed` by natural key in one transaction, so
    /// applying the same document twice leaves the tables unchanged.
    pub fn apply_seed(&mut self, seed: &SeedDocument) -> Result<SeedSummary, StoreError> {
        let tx = self.conn.transaction()?;
        let mut summary = SeedSummary::default();

        for facility in &seed.facilities {
            upsert_facility_tx(&tx, facility)?;
            summary.facilities += 1;
        }
        for department in &seed.departments {
            upsert_department_tx(&tx, department)?;
            summary.departments += 1;
        }
        for member in &seed.staff {
            upsert_staff_tx(&tx, member)?;
            summary.staff += 1;
        }
        for category in &seed.employee_categories {
            upsert_employee_category_tx(&tx, category)?;
            summary.employee_categories += 1;
        }
        for incident_type in &seed.incident_types {
            upsert_incident_type_tx(&tx, incident_type)?;
            summary.incident_types += 1;
        }

        tx.commit()?;
        tracing::info!(
            facilities = summary.facilities,
            departments = summary.departments,
            staff = summary.staff,
            employee_categories = summary.employee_categories,
            incident_types = summary.incident_types,
            "reference data applied"
        );
        Ok(summary)
    }
}

fn facility_id(value: &str) -> Result<String, StoreError> {
    FacilityId::try_new(value)
        .map(FacilityId::into_string)
        .map_err(|err| StoreError::InvalidInput(err.message()))
}

fn required(value: &str, message: &'static str) -> Result<String, StoreError> {
    clean(Some(value.to_string())).ok_or(StoreError::InvalidInput(message))
}

fn upsert_facility_tx(tx: &Transaction<'_>, seed: &FacilitySeed) -> Result<(), StoreError> {
    let id = facility_id(&seed.id)?;
    let name = required(&seed.name, "facility name must not be empty")?;
    tx.execute(
        r#"
        INSERT INTO facilities(facility_id, name, abbreviation, active)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT(facility_id) DO UPDATE SET
          name=excluded.name, abbreviation=excluded.abbreviation, active=excluded.active
        "#,
        params![
            id,
            name,
            clean(seed.abbreviation.clone()),
            ActiveFlag::from_bool(seed.active).as_str()
        ],
    )?;
    Ok(())
}

fn upsert_department_tx(tx: &Transaction<'_>, seed: &DepartmentSeed) -> Result<(), StoreError> {
    let facility = facility_id(&seed.facility_id)?;
    let name = required(&seed.name, "department name must not be empty")?;
    let kind = required(&seed.kind, "department kind must not be empty")?;
    tx.execute(
        "INSERT OR IGNORE INTO departments(facility_id, name, kind) VALUES (?1, ?2, ?3)",
        params![facility, name, kind],
    )?;
    Ok(())
}

fn upsert_staff_tx(tx: &Transaction<'_>, seed: &StaffSeed) -> Result<(), StoreError> {
    let login = LoginName::try_new(seed.login_name.as_str())
        .map_err(|err| StoreError::InvalidInput(err.message()))?;
    let first_name = required(&seed.first_name, "staff first_name must not be empty")?;
    let surname = required(&seed.surname, "staff surname must not be empty")?;
    let facility = clean(seed.facility_id.clone())
        .map(|value| facility_id(&value))
        .transpose()?;
    tx.execute(
        r#"
        INSERT INTO staff(login_name, first_name, surname, email, title, department, facility_id, active)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ON CONFLICT(login_name) DO UPDATE SET
          first_name=excluded.first_name, surname=excluded.surname, email=excluded.email,
          title=excluded.title, department=excluded.department,
          facility_id=excluded.facility_id, active=excluded.active
        "#,
        params![
            login.as_str(),
            first_name,
            surname,
            clean(seed.email.clone()),
            clean(seed.title.clone()),
            clean(seed.department.clone()),
            facility,
            ActiveFlag::from_bool(seed.active).as_str()
        ],
    )?;
    Ok(())
}

fn upsert_employee_category_tx(
    tx: &Transaction<'_>,
    seed: &EmployeeCategorySeed,
) -> Result<(), StoreError> {
    let department = required(&seed.department, "employee department must not be empty")?;
    let category = required(&seed.category, "employee category must not be empty")?;
    tx.execute(
        r#"
        INSERT INTO employee_categories(department, category, active)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(department, category) DO UPDATE SET active=excluded.active
        "#,
        params![
            department,
            category,
            ActiveFlag::from_bool(seed.active).as_str()
        ],
    )?;
    Ok(())
}

fn upsert_incident_type_tx(
    tx: &Transaction<'_>,
    seed: &IncidentTypeSeed,
) -> Result<(), StoreError> {
    let category = required(&seed.category, "incident type category must not be empty")?;
    let level = |value: &Option<String>| clean(value.clone()).unwrap_or_default();
    tx.execute(
        r#"
        INSERT INTO incident_types(category, subcategory1, subcategory2, subcategory3, active)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(category, subcategory1, subcategory2, subcategory3)
          DO UPDATE SET active=excluded.active
        "#,
        params![
            category,
            level(&seed.subcategory1),
            level(&seed.subcategory2),
            level(&seed.subcategory3),
            ActiveFlag::from_bool(seed.active).as_str()
        ],
    )?;
    Ok(())
}
