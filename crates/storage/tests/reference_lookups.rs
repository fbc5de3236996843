mod support;
use support::*;

use mims_storage::{SeedDocument, SqliteStore, StoreError};

#[test]
fn active_facilities_are_ordered_by_id() {
    let store = seeded_store("reference-facilities");

    let facilities = store.active_facilities().expect("facilities");
    let ids = facilities
        .iter()
        .map(|row| row.facility_id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["1", "2"]);
    assert_eq!(facilities[0].name, "General Hospital");
}

#[test]
fn facility_abbreviation_treats_blank_as_missing() {
    let store = seeded_store("reference-abbreviation");

    assert_eq!(
        store.facility_abbreviation("1").expect("lookup").as_deref(),
        Some("GH")
    );
    assert_eq!(store.facility_abbreviation("2").expect("lookup"), None);
    assert_eq!(store.facility_abbreviation("404").expect("lookup"), None);
}

#[test]
fn ward_departments_filter_by_facility_and_kind() {
    let store = seeded_store("reference-wards");

    assert_eq!(
        store.ward_departments("1").expect("wards"),
        vec!["Ward A", "Ward B"]
    );
    assert_eq!(store.ward_departments("2").expect("wards"), vec!["Maternity"]);
    assert!(store.ward_departments("77").expect("wards").is_empty());
    assert!(store.ward_departments(" ").expect("wards").is_empty());
}

#[test]
fn investigators_list_active_staff_of_a_facility() {
    let store = seeded_store("reference-investigators");

    let investigators = store.investigators("1").expect("investigators");
    let pairs = investigators
        .iter()
        .map(|row| (row.login_name.as_str(), row.display_name.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(
        pairs,
        vec![
            ("adlamini", "Ayanda Dlamini"),
            ("zmokoena", "Zanele Mokoena"),
        ]
    );
    assert!(store.investigators("2").expect("investigators").is_empty());
}

#[test]
fn investigator_details_ignore_inactive_staff() {
    let store = seeded_store("reference-investigator-details");

    let details = store
        .investigator_details("zmokoena")
        .expect("lookup")
        .expect("active staff member");
    assert_eq!(details.first_name, "Zanele");
    assert_eq!(details.surname, "Mokoena");
    assert_eq!(details.email.as_deref(), Some("z@gh.example"));

    assert!(store.investigator_details("retired").expect("lookup").is_none());
    assert!(store.investigator_details("nobody").expect("lookup").is_none());
}

#[test]
fn employee_categories_cascade_from_department() {
    let store = seeded_store("reference-employee-categories");

    assert_eq!(
        store.employee_departments().expect("departments"),
        vec!["Nursing", "Pharmacy"]
    );
    assert_eq!(
        store.employee_categories("Nursing").expect("categories"),
        vec!["Enrolled Nurse", "Staff Nurse"]
    );
    assert!(store.employee_categories("Kitchen").expect("categories").is_empty());
}

#[test]
fn applying_the_same_seed_twice_is_stable() {
    let mut store = seeded_store("reference-seed-idempotent");
    let seed = SeedDocument::from_yaml_str(REFERENCE_SEED).expect("seed parses");

    let summary = store.apply_seed(&seed).expect("second apply");
    assert_eq!(summary.facilities, 3);
    assert_eq!(summary.incident_types, 9);

    assert_eq!(store.active_facilities().expect("facilities").len(), 2);
    assert_eq!(
        store.ward_departments("1").expect("wards"),
        vec!["Ward A", "Ward B"]
    );
    assert_eq!(
        store.subcategories(2, "Falls").expect("level 2"),
        vec!["From bed", "In bathroom", "Sedation related"]
    );
}

#[test]
fn seed_documents_reject_unknown_fields_and_bad_ids() {
    let err = SeedDocument::from_yaml_str("hospitals: []\n").expect_err("unknown section");
    assert_eq!(err.code(), "SEED_INVALID");

    let dir = temp_storage_dir("reference-seed-bad-id");
    let mut store = SqliteStore::open(&dir).expect("open");
    let seed = SeedDocument::from_yaml_str("facilities:\n  - { id: \"a b\", name: \"Bad\" }\n")
        .expect("syntactically valid");
    let err = store.apply_seed(&seed).expect_err("invalid facility id");
    assert!(matches!(err, StoreError::InvalidInput(_)));
    assert!(store.active_facilities().expect("facilities").is_empty());
}

#[test]
fn seed_reports_why_a_staff_login_is_rejected() {
    let dir = temp_storage_dir("reference-seed-bad-login");
    let mut store = SqliteStore::open(&dir).expect("open");
    let seed = SeedDocument::from_yaml_str(
        "staff:\n  - { login_name: \"j doe\", first_name: \"J\", surname: \"Doe\" }\n",
    )
    .expect("syntactically valid");
    let err = store.apply_seed(&seed).expect_err("invalid login");
    assert!(matches!(
        err,
        StoreError::InvalidInput("login name contains whitespace or control characters")
    ));
    assert!(store.investigator_details("j doe").expect("lookup").is_none());
}
