mod support;
use support::*;

use mims_storage::{
    CapturedBy, IncidentPatch, NewIncident, SqliteStore, StoreError, TaxonomySelection,
};
use time::macros::datetime;

fn falls_report(facility_id: Option<&str>) -> NewIncident {
    NewIncident {
        facility_id: facility_id.map(str::to_string),
        affected_ward: Some("Ward A".to_string()),
        summary: Some("Patient found on floor".to_string()),
        incident_date: Some("2025-05-30".to_string()),
        date_reported: Some("2025-05-31".to_string()),
        taxonomy: TaxonomySelection {
            category: Some("Patient Care".to_string()),
            subcategory1: Some("Falls".to_string()),
            subcategory2: Some("From bed".to_string()),
            subcategory3: None,
        },
        captured_by: CapturedBy {
            login_name: Some("zmokoena".to_string()),
            first_name: Some("Zanele".to_string()),
            surname: Some("Mokoena".to_string()),
            email: Some("z@gh.example".to_string()),
            ..CapturedBy::default()
        },
        ..NewIncident::default()
    }
}

#[test]
fn create_writes_identifier_back_from_capture_date() {
    let mut store = seeded_store("incident-create");

    let created = store
        .create_incident_at(falls_report(Some("1")), datetime!(2025-06-05 10:30 UTC))
        .expect("incident should be created");
    assert_eq!(created.revision, 0);
    assert_eq!(created.identifier, format!("GH-5-6-{}", created.id));

    let row = store
        .get_incident(created.id)
        .expect("read back")
        .expect("row exists");
    assert_eq!(row.identifier.as_deref(), Some(created.identifier.as_str()));
    assert_eq!(row.status, "draft");
    assert_eq!(row.active, "Y");
    assert_eq!(row.revision, 0);
    assert_eq!(row.date_captured, "2025-06-05");
    assert_eq!(row.time_captured, "10:30");
    assert_eq!(row.expires_on, "2025-06-10");
    assert_eq!(row.incident_date.as_deref(), Some("2025-05-30"));
    assert_eq!(row.taxonomy.subcategory2.as_deref(), Some("From bed"));
    assert_eq!(row.captured_by.login_name.as_deref(), Some("zmokoena"));
}

#[test]
fn identifier_id_component_increases_per_insert() {
    let mut store = seeded_store("incident-monotonic");
    let at = datetime!(2025-01-09 08:00 UTC);

    let first = store
        .create_incident_at(falls_report(Some("1")), at)
        .expect("first");
    let second = store
        .create_incident_at(falls_report(Some("1")), at)
        .expect("second");

    assert!(second.id > first.id);
    assert_eq!(first.identifier, format!("GH-9-1-{}", first.id));
    assert_eq!(second.identifier, format!("GH-9-1-{}", second.id));
}

#[test]
fn missing_abbreviation_falls_back_to_placeholder() {
    let mut store = seeded_store("incident-fallback");
    let at = datetime!(2025-12-24 23:59 UTC);

    let blank_abbr = store
        .create_incident_at(falls_report(Some("2")), at)
        .expect("facility with blank abbreviation");
    assert_eq!(blank_abbr.identifier, format!("XX-24-12-{}", blank_abbr.id));

    let unknown = store
        .create_incident_at(falls_report(Some("99")), at)
        .expect("unknown facility");
    assert_eq!(unknown.identifier, format!("XX-24-12-{}", unknown.id));

    let none = store
        .create_incident_at(falls_report(None), at)
        .expect("no facility");
    assert_eq!(none.identifier, format!("XX-24-12-{}", none.id));
}

#[test]
fn supplied_status_and_capture_time_are_kept() {
    let mut store = seeded_store("incident-supplied");
    let request = NewIncident {
        status: Some(" Open ".to_string()),
        time_captured: Some("07:15".to_string()),
        ..falls_report(Some("1"))
    };

    let created = store
        .create_incident_at(request, datetime!(2025-03-01 12:00 UTC))
        .expect("created");
    let row = store.get_incident(created.id).expect("read").expect("row");
    assert_eq!(row.status, "Open");
    assert_eq!(row.time_captured, "07:15");
}

#[test]
fn invalid_facility_id_is_rejected() {
    let mut store = seeded_store("incident-bad-facility");

    let err = store
        .create_incident_at(falls_report(Some("1; DROP")), datetime!(2025-03-01 12:00 UTC))
        .expect_err("facility ids are validated");
    assert!(matches!(err, StoreError::InvalidInput(_)));
}

#[test]
fn regenerating_across_a_day_boundary_changes_the_identifier() {
    let mut store = seeded_store("incident-regenerate");

    let created = store
        .create_incident_at(falls_report(Some("1")), datetime!(2025-06-05 23:59 UTC))
        .expect("created");
    let same_day = store
        .regenerate_identifier_at(created.id, datetime!(2025-06-05 23:59:30 UTC))
        .expect("same day");
    assert_eq!(same_day.as_str(), created.identifier);

    let next_day = store
        .regenerate_identifier_at(created.id, datetime!(2025-06-06 00:00:01 UTC))
        .expect("next day");
    assert_eq!(next_day.as_str(), format!("GH-6-6-{}", created.id));

    let row = store.get_incident(created.id).expect("read").expect("row");
    assert_eq!(row.identifier.as_deref(), Some(next_day.as_str()));

    let err = store
        .regenerate_identifier_at(created.id + 1000, datetime!(2025-06-06 00:00 UTC))
        .expect_err("unknown incident");
    assert!(matches!(err, StoreError::UnknownId));
}

#[test]
fn edits_bump_revision_and_keep_untouched_fields() {
    let mut store = seeded_store("incident-edit");
    let created = store
        .create_incident_at(falls_report(Some("1")), datetime!(2025-06-05 10:30 UTC))
        .expect("created");

    let edited = store
        .edit_incident(
            created.id,
            &IncidentPatch {
                status: Some("Assigned".to_string()),
                assigned_staff: Some(Some("adlamini".to_string())),
                incident_area_night: Some(Some("Y".to_string())),
                ..IncidentPatch::default()
            },
        )
        .expect("edit applies");
    assert_eq!(edited.revision, 1);

    let row = store.get_incident(created.id).expect("read").expect("row");
    assert_eq!(row.status, "Assigned");
    assert_eq!(row.lifecycle.assigned_staff.as_deref(), Some("adlamini"));
    assert_eq!(row.incident_area_night.as_deref(), Some("Y"));
    assert_eq!(row.summary.as_deref(), Some("Patient found on floor"));
    assert_eq!(row.identifier.as_deref(), Some(created.identifier.as_str()));

    let cleared = store
        .edit_incident(
            created.id,
            &IncidentPatch {
                expected_revision: Some(1),
                assigned_staff: Some(None),
                closed_desc: Some(Some("Reviewed with unit manager".to_string())),
                status: Some("Closed".to_string()),
                ..IncidentPatch::default()
            },
        )
        .expect("second edit applies");
    assert_eq!(cleared.revision, 2);

    let row = store.get_incident(created.id).expect("read").expect("row");
    assert_eq!(row.lifecycle.assigned_staff, None);
    assert_eq!(
        row.lifecycle.closed_desc.as_deref(),
        Some("Reviewed with unit manager")
    );
    assert_eq!(row.status, "Closed");
}

#[test]
fn any_status_transition_is_accepted() {
    let mut store = seeded_store("incident-no-state-machine");
    let created = store
        .create_incident_at(falls_report(Some("1")), datetime!(2025-06-05 10:30 UTC))
        .expect("created");

    for status in ["Closed", "draft", "On Hold", "Open"] {
        store
            .edit_incident(
                created.id,
                &IncidentPatch {
                    status: Some(status.to_string()),
                    ..IncidentPatch::default()
                },
            )
            .expect("status edit");
    }
    let row = store.get_incident(created.id).expect("read").expect("row");
    assert_eq!(row.status, "Open");
    assert_eq!(row.revision, 4);
}

#[test]
fn edit_rejects_stale_empty_and_unknown() {
    let mut store = seeded_store("incident-edit-errors");
    let created = store
        .create_incident_at(falls_report(Some("1")), datetime!(2025-06-05 10:30 UTC))
        .expect("created");

    let stale = store
        .edit_incident(
            created.id,
            &IncidentPatch {
                expected_revision: Some(7),
                status: Some("Open".to_string()),
                ..IncidentPatch::default()
            },
        )
        .expect_err("stale revision");
    assert!(matches!(
        stale,
        StoreError::RevisionMismatch {
            expected: 7,
            actual: 0
        }
    ));

    let empty = store
        .edit_incident(created.id, &IncidentPatch::default())
        .expect_err("empty patch");
    assert!(matches!(empty, StoreError::InvalidInput("no fields to edit")));

    let blank_status = store
        .edit_incident(
            created.id,
            &IncidentPatch {
                status: Some("  ".to_string()),
                ..IncidentPatch::default()
            },
        )
        .expect_err("blank status");
    assert!(matches!(blank_status, StoreError::InvalidInput(_)));

    let unknown = store
        .edit_incident(
            created.id + 1000,
            &IncidentPatch {
                status: Some("Open".to_string()),
                ..IncidentPatch::default()
            },
        )
        .expect_err("unknown id");
    assert_eq!(unknown.code(), "UNKNOWN_ID");

    let row = store.get_incident(created.id).expect("read").expect("row");
    assert_eq!(row.revision, 0, "failed edits must not change the row");
}

#[test]
fn patch_json_distinguishes_absent_from_null() {
    let patch: IncidentPatch = serde_json::from_str(
        r#"{ "status": "Open", "assigned_staff": null, "investigation": "root cause" }"#,
    )
    .expect("patch parses");

    assert_eq!(patch.status.as_deref(), Some("Open"));
    assert_eq!(patch.assigned_staff, Some(None));
    assert_eq!(patch.investigation, Some(Some("root cause".to_string())));
    assert_eq!(patch.closed_desc, None);
    assert_eq!(patch.expected_revision, None);
}

#[test]
fn incidents_survive_reopening_the_store() {
    let dir = temp_storage_dir("incident-reopen");
    let created = {
        let mut store = SqliteStore::open(&dir).expect("open");
        store
            .create_incident_at(falls_report(None), datetime!(2025-02-02 02:02 UTC))
            .expect("created")
    };

    let store = SqliteStore::open(&dir).expect("reopen");
    let row = store.get_incident(created.id).expect("read").expect("row");
    assert_eq!(row.identifier.as_deref(), Some(created.identifier.as_str()));
    assert!(store.get_incident(created.id + 1).expect("read").is_none());
}

#[test]
fn concurrent_editors_on_separate_connections_never_hit_sqlite_errors() {
    let mut store = seeded_store("incident-concurrent-edit");
    let created = store
        .create_incident_at(falls_report(Some("1")), datetime!(2025-06-05 10:30 UTC))
        .expect("create");
    let dir = store.storage_dir().to_path_buf();
    drop(store);

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let dir = dir.clone();
            std::thread::spawn(move || {
                let mut store = SqliteStore::open(&dir).expect("open per worker");
                let mut applied = 0i64;
                for round in 0..10 {
                    let current = store
                        .get_incident(created.id)
                        .expect("read")
                        .expect("row exists")
                        .revision;
                    let patch = IncidentPatch {
                        expected_revision: Some(current),
                        status: Some(format!("worker-{worker}-{round}")),
                        ..IncidentPatch::default()
                    };
                    match store.edit_incident(created.id, &patch) {
                        Ok(_) => applied += 1,
                        Err(StoreError::RevisionMismatch { .. }) => {}
                        Err(other) => panic!("unexpected edit failure: {other}"),
                    }
                    let unchecked = IncidentPatch {
                        closed_desc: Some(Some(format!("note {worker}-{round}"))),
                        ..IncidentPatch::default()
                    };
                    store
                        .edit_incident(created.id, &unchecked)
                        .expect("edit without expected revision always applies");
                    applied += 1;
                }
                applied
            })
        })
        .collect();

    let applied: i64 = workers
        .into_iter()
        .map(|worker| worker.join().expect("worker thread"))
        .sum();

    let store = SqliteStore::open(&dir).expect("reopen");
    let row = store
        .get_incident(created.id)
        .expect("read")
        .expect("row exists");
    assert_eq!(row.revision, applied);
}
