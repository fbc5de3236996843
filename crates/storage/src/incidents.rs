#![forbid(unsafe_code)]

use super::clock::{format_date, format_hh_mm, local_now, now_ms, unix_ms};
use super::reference::facility_abbreviation;
use super::{
    CapturedBy, CreatedIncident, EditedIncident, IncidentLifecycle, IncidentPatch, IncidentRow,
    NewIncident, PatientDetails, SqliteStore, StoreError, TaxonomySelection, clean,
};
use mims_core::identifier::IncidentIdentifier;
use mims_core::ids::FacilityId;
use mims_core::model::{ActiveFlag, DEFAULT_INCIDENT_STATUS, INCIDENT_EXPIRY_DAYS};
use rusqlite::types::Value;
use rusqlite::{
    Connection, OptionalExtension, Row, TransactionBehavior, named_params, params, params_from_iter,
};
use std::fmt::Write as _;
use time::{Duration, OffsetDateTime};

impl SqliteStore {
    pub fn create_incident(&mut self, request: NewIncident) -> Result<CreatedIncident, StoreError> {
        self.create_incident_at(request, local_now())
    }

    /// Inserts the incident and writes its identifier back in the same
    /// transaction. Date parts of the identifier come from `captured_at`,
    /// never from the reported incident date.
    pub fn create_incident_at(
        &mut self,
        request: NewIncident,
        captured_at: OffsetDateTime,
    ) -> Result<CreatedIncident, StoreError> {
        let NewIncident {
            facility_id,
            status,
            affected_ward,
            incident_area,
            incident_area_night,
            criteria,
            criteria_sub,
            priority,
            summary,
            description,
            incident_date,
            incident_time,
            date_reported,
            time_captured,
            acquired,
            med_related_total,
            investigated_by,
            assigned_category,
            assigned_staff,
            patient,
            taxonomy,
            captured_by,
        } = request;

        let facility_id = clean(facility_id)
            .map(|value| {
                FacilityId::try_new(value)
                    .map(FacilityId::into_string)
                    .map_err(|err| StoreError::InvalidInput(err.message()))
            })
            .transpose()?;

        let status = clean(status).unwrap_or_else(|| DEFAULT_INCIDENT_STATUS.to_string());
        let captured_date = captured_at.date();
        let date_captured = format_date(captured_date)?;
        let time_captured = match clean(time_captured) {
            Some(value) => value,
            None => format_hh_mm(captured_at.time())?,
        };
        let expires_on =
            format_date(captured_date.saturating_add(Duration::days(INCIDENT_EXPIRY_DAYS)))?;
        let now_ms = unix_ms(captured_at);

        let tx = self.conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO incidents(
              revision, status, active, facility_id,
              affected_ward, incident_area, incident_area_night, criteria, criteria_sub,
              priority, summary, description, incident_date, incident_time, date_reported,
              date_captured, time_captured, expires_on, acquired, med_related_total,
              patient_involved, patient_number, patient_name, patient_surname, patient_title,
              category, subcategory1, subcategory2, subcategory3,
              captured_by_login, captured_by_first_name, captured_by_surname,
              captured_by_title, captured_by_email, captured_by_department,
              investigated_by, assigned_category, assigned_staff,
              created_at_ms, updated_at_ms
            ) VALUES (
              0, :status, :active, :facility_id,
              :affected_ward, :incident_area, :incident_area_night, :criteria, :criteria_sub,
              :priority, :summary, :description, :incident_date, :incident_time, :date_reported,
              :date_captured, :time_captured, :expires_on, :acquired, :med_related_total,
              :patient_involved, :patient_number, :patient_name, :patient_surname, :patient_title,
              :category, :subcategory1, :subcategory2, :subcategory3,
              :captured_by_login, :captured_by_first_name, :captured_by_surname,
              :captured_by_title, :captured_by_email, :captured_by_department,
              :investigated_by, :assigned_category, :assigned_staff,
              :now_ms, :now_ms
            )
            "#,
            named_params! {
                ":status": status,
                ":active": ActiveFlag::Yes.as_str(),
                ":facility_id": facility_id,
                ":affected_ward": clean(affected_ward),
                ":incident_area": clean(incident_area),
                ":incident_area_night": clean(incident_area_night),
                ":criteria": clean(criteria),
                ":criteria_sub": clean(criteria_sub),
                ":priority": clean(priority),
                ":summary": clean(summary),
                ":description": clean(description),
                ":incident_date": clean(incident_date),
                ":incident_time": clean(incident_time),
                ":date_reported": clean(date_reported),
                ":date_captured": date_captured,
                ":time_captured": time_captured,
                ":expires_on": expires_on,
                ":acquired": clean(acquired),
                ":med_related_total": clean(med_related_total),
                ":patient_involved": clean(patient.involved),
                ":patient_number": clean(patient.number),
                ":patient_name": clean(patient.name),
                ":patient_surname": clean(patient.surname),
                ":patient_title": clean(patient.title),
                ":category": clean(taxonomy.category),
                ":subcategory1": clean(taxonomy.subcategory1),
                ":subcategory2": clean(taxonomy.subcategory2),
                ":subcategory3": clean(taxonomy.subcategory3),
                ":captured_by_login": clean(captured_by.login_name),
                ":captured_by_first_name": clean(captured_by.first_name),
                ":captured_by_surname": clean(captured_by.surname),
                ":captured_by_title": clean(captured_by.title),
                ":captured_by_email": clean(captured_by.email),
                ":captured_by_department": clean(captured_by.department),
                ":investigated_by": clean(investigated_by),
                ":assigned_category": clean(assigned_category),
                ":assigned_staff": clean(assigned_staff),
                ":now_ms": now_ms,
            },
        )?;
        let id = tx.last_insert_rowid();

        let identifier = write_identifier(&tx, id, facility_id.as_deref(), captured_at)?;
        tx.commit()?;

        tracing::info!(incident_id = id, identifier = %identifier, "incident created");
        Ok(CreatedIncident {
            id,
            identifier: identifier.into_string(),
            revision: 0,
        })
    }

    /// Recomputes the identifier from today's date; the result differs from
    /// the stored one once the calendar day has moved on.
    pub fn regenerate_identifier(&mut self, id: i64) -> Result<IncidentIdentifier, StoreError> {
        self.regenerate_identifier_at(id, local_now())
    }

    pub fn regenerate_identifier_at(
        &mut self,
        id: i64,
        generated_at: OffsetDateTime,
    ) -> Result<IncidentIdentifier, StoreError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let facility_id = tx
            .query_row(
                "SELECT facility_id FROM incidents WHERE id = ?1",
                params![id],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?;
        let Some(facility_id) = facility_id else {
            return Err(StoreError::UnknownId);
        };

        let identifier = write_identifier(&tx, id, facility_id.as_deref(), generated_at)?;
        tx.commit()?;
        Ok(identifier)
    }

    pub fn get_incident(&self, id: i64) -> Result<Option<IncidentRow>, StoreError> {
        Ok(self
            .conn
            .query_row(
                "SELECT * FROM incidents WHERE id = ?1",
                params![id],
                incident_from_row,
            )
            .optional()?)
    }

    /// Applies a lifecycle patch. There is no status transition table: any
    /// non-blank status is accepted.
    pub fn edit_incident(
        &mut self,
        id: i64,
        patch: &IncidentPatch,
    ) -> Result<EditedIncident, StoreError> {
        let mut assignments: Vec<(&'static str, Value)> = Vec::new();
        if let Some(status) = &patch.status {
            let status = clean(Some(status.clone()))
                .ok_or(StoreError::InvalidInput("status must not be blank"))?;
            assignments.push(("status", Value::Text(status)));
        }
        for (column, change) in patch.nullable_columns() {
            if let Some(value) = change {
                let value = match clean(value.clone()) {
                    Some(text) => Value::Text(text),
                    None => Value::Null,
                };
                assignments.push((column, value));
            }
        }
        if assignments.is_empty() {
            return Err(StoreError::InvalidInput("no fields to edit"));
        }

        let now_ms = now_ms();
        // Taking the write lock before the revision read keeps a concurrent
        // editor from invalidating this snapshot mid-transaction.
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let revision = tx
            .query_row(
                "SELECT revision FROM incidents WHERE id = ?1",
                params![id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        let Some(revision) = revision else {
            return Err(StoreError::UnknownId);
        };

        if let Some(expected) = patch.expected_revision {
            if expected != revision {
                return Err(StoreError::RevisionMismatch {
                    expected,
                    actual: revision,
                });
            }
        }

        let new_revision = revision + 1;
        let mut sql = String::from("UPDATE incidents SET revision = ?1, updated_at_ms = ?2");
        let mut values = vec![Value::Integer(new_revision), Value::Integer(now_ms)];
        for (column, value) in assignments {
            values.push(value);
            let _ = write!(sql, ", {column} = ?{}", values.len());
        }
        values.push(Value::Integer(id));
        let _ = write!(sql, " WHERE id = ?{}", values.len());

        tx.execute(&sql, params_from_iter(values))?;
        tx.commit()?;

        tracing::info!(incident_id = id, revision = new_revision, "incident edited");
        Ok(EditedIncident {
            id,
            revision: new_revision,
        })
    }
}

fn write_identifier(
    conn: &Connection,
    id: i64,
    facility_id: Option<&str>,
    generated_at: OffsetDateTime,
) -> Result<IncidentIdentifier, StoreError> {
    let abbreviation = match facility_id {
        Some(facility_id) => facility_abbreviation(conn, facility_id)?,
        None => None,
    };
    let date = generated_at.date();
    let identifier = IncidentIdentifier::compose(
        abbreviation.as_deref(),
        date.day(),
        u8::from(date.month()),
        id,
    );

    conn.execute(
        "UPDATE incidents SET identifier = ?2 WHERE id = ?1",
        params![id, identifier.as_str()],
    )?;
    Ok(identifier)
}

fn incident_from_row(row: &Row<'_>) -> rusqlite::Result<IncidentRow> {
    Ok(IncidentRow {
        id: row.get("id")?,
        identifier: row.get("identifier")?,
        revision: row.get("revision")?,
        status: row.get("status")?,
        active: row.get("active")?,
        facility_id: row.get("facility_id")?,
        affected_ward: row.get("affected_ward")?,
        incident_area: row.get("incident_area")?,
        incident_area_night: row.get("incident_area_night")?,
        criteria: row.get("criteria")?,
        criteria_sub: row.get("criteria_sub")?,
        priority: row.get("priority")?,
        summary: row.get("summary")?,
        description: row.get("description")?,
        incident_date: row.get("incident_date")?,
        incident_time: row.get("incident_time")?,
        date_reported: row.get("date_reported")?,
        date_captured: row.get("date_captured")?,
        time_captured: row.get("time_captured")?,
        expires_on: row.get("expires_on")?,
        acquired: row.get("acquired")?,
        med_related_total: row.get("med_related_total")?,
        patient: PatientDetails {
            involved: row.get("patient_involved")?,
            number: row.get("patient_number")?,
            name: row.get("patient_name")?,
            surname: row.get("patient_surname")?,
            title: row.get("patient_title")?,
        },
        taxonomy: TaxonomySelection {
            category: row.get("category")?,
            subcategory1: row.get("subcategory1")?,
            subcategory2: row.get("subcategory2")?,
            subcategory3: row.get("subcategory3")?,
        },
        captured_by: CapturedBy {
            login_name: row.get("captured_by_login")?,
            first_name: row.get("captured_by_first_name")?,
            surname: row.get("captured_by_surname")?,
            title: row.get("captured_by_title")?,
            email: row.get("captured_by_email")?,
            department: row.get("captured_by_department")?,
        },
        lifecycle: IncidentLifecycle {
            investigated_by: row.get("investigated_by")?,
            assigned_category: row.get("assigned_category")?,
            assigned_staff: row.get("assigned_staff")?,
            on_hold_desc: row.get("on_hold_desc")?,
            on_hold_date: row.get("on_hold_date")?,
            on_hold_time: row.get("on_hold_time")?,
            closed_desc: row.get("closed_desc")?,
            closed_date: row.get("closed_date")?,
            closed_time: row.get("closed_time")?,
            corrective_action: row.get("corrective_action")?,
            corrective_action_date: row.get("corrective_action_date")?,
            corrective_action_time: row.get("corrective_action_time")?,
            preventive_action: row.get("preventive_action")?,
            preventive_action_date: row.get("preventive_action_date")?,
            preventive_action_time: row.get("preventive_action_time")?,
            investigation: row.get("investigation")?,
            summary2: row.get("summary2")?,
        },
        created_at_ms: row.get("created_at_ms")?,
        updated_at_ms: row.get("updated_at_ms")?,
    })
}
