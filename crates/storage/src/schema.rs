#![forbid(unsafe_code)]

use super::StoreError;
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeSet;

pub(crate) const SCHEMA_VERSION: &str = "1";

const REQUIRED_TABLES: [&str; 8] = [
    "meta",
    "facilities",
    "departments",
    "staff",
    "employee_categories",
    "incident_types",
    "incidents",
    "attachments",
];

const SQL: &str = r#"
    PRAGMA journal_mode=WAL;
    PRAGMA synchronous=NORMAL;

    CREATE TABLE IF NOT EXISTS meta (
      key TEXT PRIMARY KEY,
      value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS facilities (
      facility_id TEXT PRIMARY KEY,
      name TEXT NOT NULL,
      abbreviation TEXT,
      active TEXT NOT NULL DEFAULT 'Y'
    );

    CREATE TABLE IF NOT EXISTS departments (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      facility_id TEXT NOT NULL,
      name TEXT NOT NULL,
      kind TEXT NOT NULL,
      UNIQUE (facility_id, name, kind)
    );

    CREATE TABLE IF NOT EXISTS staff (
      login_name TEXT PRIMARY KEY,
      first_name TEXT NOT NULL,
      surname TEXT NOT NULL,
      email TEXT,
      title TEXT,
      department TEXT,
      facility_id TEXT,
      active TEXT NOT NULL DEFAULT 'Y'
    );

    CREATE TABLE IF NOT EXISTS employee_categories (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      department TEXT NOT NULL,
      category TEXT NOT NULL,
      active TEXT NOT NULL DEFAULT 'Y',
      UNIQUE (department, category)
    );

    -- Flat, denormalized hierarchy: a child value only means something next to
    -- its immediate parent column. Missing levels are stored as ''.
    CREATE TABLE IF NOT EXISTS incident_types (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      category TEXT NOT NULL,
      subcategory1 TEXT NOT NULL DEFAULT '',
      subcategory2 TEXT NOT NULL DEFAULT '',
      subcategory3 TEXT NOT NULL DEFAULT '',
      active TEXT NOT NULL DEFAULT 'Y',
      UNIQUE (category, subcategory1, subcategory2, subcategory3)
    );

    CREATE TABLE IF NOT EXISTS incidents (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      identifier TEXT,
      revision INTEGER NOT NULL,
      status TEXT NOT NULL,
      active TEXT NOT NULL,
      facility_id TEXT,
      affected_ward TEXT,
      incident_area TEXT,
      incident_area_night TEXT,
      criteria TEXT,
      criteria_sub TEXT,
      priority TEXT,
      summary TEXT,
      description TEXT,
      incident_date TEXT,
      incident_time TEXT,
      date_reported TEXT,
      date_captured TEXT NOT NULL,
      time_captured TEXT NOT NULL,
      expires_on TEXT NOT NULL,
      acquired TEXT,
      med_related_total TEXT,
      patient_involved TEXT,
      patient_number TEXT,
      patient_name TEXT,
      patient_surname TEXT,
      patient_title TEXT,
      category TEXT,
      subcategory1 TEXT,
      subcategory2 TEXT,
      subcategory3 TEXT,
      captured_by_login TEXT,
      captured_by_first_name TEXT,
      captured_by_surname TEXT,
      captured_by_title TEXT,
      captured_by_email TEXT,
      captured_by_department TEXT,
      investigated_by TEXT,
      assigned_category TEXT,
      assigned_staff TEXT,
      on_hold_desc TEXT,
      on_hold_date TEXT,
      on_hold_time TEXT,
      closed_desc TEXT,
      closed_date TEXT,
      closed_time TEXT,
      corrective_action TEXT,
      corrective_action_date TEXT,
      corrective_action_time TEXT,
      preventive_action TEXT,
      preventive_action_date TEXT,
      preventive_action_time TEXT,
      investigation TEXT,
      summary2 TEXT,
      created_at_ms INTEGER NOT NULL,
      updated_at_ms INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS attachments (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      incident_id INTEGER NOT NULL REFERENCES incidents(id) ON DELETE CASCADE,
      file_name TEXT NOT NULL,
      content_type TEXT,
      size_bytes INTEGER NOT NULL,
      created_at_ms INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_incident_types_active_category
      ON incident_types(active, category);
    CREATE INDEX IF NOT EXISTS idx_departments_facility_kind
      ON departments(facility_id, kind, name);
    CREATE INDEX IF NOT EXISTS idx_staff_facility_active
      ON staff(facility_id, active);
    CREATE INDEX IF NOT EXISTS idx_incidents_facility
      ON incidents(facility_id, id);
    CREATE INDEX IF NOT EXISTS idx_attachments_incident
      ON attachments(incident_id);
"#;

pub(crate) fn migrate(conn: &Connection) -> Result<(), StoreError> {
    preflight_gate(conn)?;
    conn.execute_batch(SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO meta(key, value) VALUES (?1, ?2)",
        params!["schema_version", SCHEMA_VERSION],
    )?;
    Ok(())
}

/// Refuses to open a database written by an incompatible schema.
fn preflight_gate(conn: &Connection) -> Result<(), StoreError> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
    )?;
    let mut rows = stmt.query([])?;
    let mut tables = BTreeSet::new();
    while let Some(row) = rows.next()? {
        tables.insert(row.get::<_, String>(0)?);
    }

    if tables.is_empty() {
        return Ok(());
    }

    if tables
        .iter()
        .any(|table| !REQUIRED_TABLES.contains(&table.as_str()))
    {
        return Err(StoreError::InvalidInput(
            "RESET_REQUIRED: unsupported tables detected",
        ));
    }

    if !tables.contains("meta") {
        return Err(StoreError::InvalidInput(
            "RESET_REQUIRED: schema state row is missing",
        ));
    }

    let version = conn
        .query_row(
            "SELECT value FROM meta WHERE key='schema_version'",
            [],
            |row| row.get::<_, String>(0),
        )
        .optional()?;

    match version.as_deref() {
        Some(SCHEMA_VERSION) => Ok(()),
        Some(_) => Err(StoreError::InvalidInput(
            "RESET_REQUIRED: schema version mismatch",
        )),
        None => Err(StoreError::InvalidInput(
            "RESET_REQUIRED: schema state row is missing",
        )),
    }
}
