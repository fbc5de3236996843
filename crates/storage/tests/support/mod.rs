#![allow(dead_code)]

use mims_storage::{SeedDocument, SqliteStore};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

pub const REFERENCE_SEED: &str = r#"
facilities:
  - { id: "1", name: "General Hospital", abbreviation: "GH" }
  - { id: "2", name: "Riverside Clinic", abbreviation: "   " }
  - { id: "3", name: "Closed Annex", abbreviation: "CA", active: false }

departments:
  - { facility_id: "1", name: "Ward B" }
  - { facility_id: "1", name: "Ward A" }
  - { facility_id: "1", name: "Pharmacy", kind: "support" }
  - { facility_id: "2", name: "Maternity" }

staff:
  - { login_name: "zmokoena", first_name: "Zanele", surname: "Mokoena", email: "z@gh.example", facility_id: "1" }
  - { login_name: "adlamini", first_name: "Ayanda", surname: "Dlamini", email: "a@gh.example", facility_id: "1" }
  - { login_name: "retired", first_name: "Old", surname: "Timer", facility_id: "1", active: false }

employee_categories:
  - { department: "Nursing", category: "Staff Nurse" }
  - { department: "Nursing", category: "Enrolled Nurse" }
  - { department: "Nursing", category: "Auxiliary", active: false }
  - { department: "Pharmacy", category: "Pharmacist" }

incident_types:
  - { category: "Patient Care", subcategory1: "Falls", subcategory2: "From bed", subcategory3: "Rails down" }
  - { category: "Patient Care", subcategory1: "Falls", subcategory2: "From bed", subcategory3: "Unattended" }
  - { category: "Patient Care", subcategory1: "Falls", subcategory2: "In bathroom" }
  - { category: "Patient Care", subcategory1: "Pressure Ulcer" }
  - { category: "Patient Care", subcategory1: "Absconding", active: false }
  - { category: "Medication", subcategory1: "Wrong dose", subcategory2: "Overdose" }
  - { category: "Medication", subcategory1: "Falls", subcategory2: "Sedation related" }
  - { category: "Equipment" }
  - { category: "Security", active: false }
"#;

pub fn temp_storage_dir(label: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be monotonic enough for tests")
        .as_nanos();
    path.push(format!(
        "mims-storage-{label}-{}-{nanos}",
        std::process::id()
    ));
    std::fs::create_dir_all(&path).expect("temp storage dir must be creatable");
    path
}

pub fn seeded_store(label: &str) -> SqliteStore {
    let dir = temp_storage_dir(label);
    let mut store = SqliteStore::open(&dir).expect("fresh storage should open");
    let seed = SeedDocument::from_yaml_str(REFERENCE_SEED).expect("reference seed must parse");
    store.apply_seed(&seed).expect("reference seed must apply");
    store
}
