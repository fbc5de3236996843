#![forbid(unsafe_code)]

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientDetails {
    pub involved: Option<String>,
    pub number: Option<String>,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub title: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxonomySelection {
    pub category: Option<String>,
    pub subcategory1: Option<String>,
    pub subcategory2: Option<String>,
    pub subcategory3: Option<String>,
}

/// Staff member capturing the report, as known to the caller's session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapturedBy {
    pub login_name: Option<String>,
    pub first_name: Option<String>,
    pub surname: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewIncident {
    pub facility_id: Option<String>,
    pub status: Option<String>,
    pub affected_ward: Option<String>,
    pub incident_area: Option<String>,
    pub incident_area_night: Option<String>,
    pub criteria: Option<String>,
    pub criteria_sub: Option<String>,
    pub priority: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub incident_date: Option<String>,
    pub incident_time: Option<String>,
    pub date_reported: Option<String>,
    pub time_captured: Option<String>,
    pub acquired: Option<String>,
    pub med_related_total: Option<String>,
    pub investigated_by: Option<String>,
    pub assigned_category: Option<String>,
    pub assigned_staff: Option<String>,
    pub patient: PatientDetails,
    pub taxonomy: TaxonomySelection,
    pub captured_by: CapturedBy,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CreatedIncident {
    pub id: i64,
    pub identifier: String,
    pub revision: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EditedIncident {
    pub id: i64,
    pub revision: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IncidentLifecycle {
    pub investigated_by: Option<String>,
    pub assigned_category: Option<String>,
    pub assigned_staff: Option<String>,
    pub on_hold_desc: Option<String>,
    pub on_hold_date: Option<String>,
    pub on_hold_time: Option<String>,
    pub closed_desc: Option<String>,
    pub closed_date: Option<String>,
    pub closed_time: Option<String>,
    pub corrective_action: Option<String>,
    pub corrective_action_date: Option<String>,
    pub corrective_action_time: Option<String>,
    pub preventive_action: Option<String>,
    pub preventive_action_date: Option<String>,
    pub preventive_action_time: Option<String>,
    pub investigation: Option<String>,
    pub summary2: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IncidentRow {
    pub id: i64,
    pub identifier: Option<String>,
    pub revision: i64,
    pub status: String,
    pub active: String,
    pub facility_id: Option<String>,
    pub affected_ward: Option<String>,
    pub incident_area: Option<String>,
    pub incident_area_night: Option<String>,
    pub criteria: Option<String>,
    pub criteria_sub: Option<String>,
    pub priority: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub incident_date: Option<String>,
    pub incident_time: Option<String>,
    pub date_reported: Option<String>,
    pub date_captured: String,
    pub time_captured: String,
    pub expires_on: String,
    pub acquired: Option<String>,
    pub med_related_total: Option<String>,
    pub patient: PatientDetails,
    pub taxonomy: TaxonomySelection,
    pub captured_by: CapturedBy,
    pub lifecycle: IncidentLifecycle,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

/// Partial update of an incident's lifecycle fields.
///
/// A missing key leaves the column untouched, an explicit `null` clears it.
/// `status` can be replaced but never cleared.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IncidentPatch {
    pub expected_revision: Option<i64>,
    pub status: Option<String>,
    #[serde(deserialize_with = "present")]
    pub incident_area_night: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub investigated_by: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub assigned_category: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub assigned_staff: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub on_hold_desc: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub on_hold_date: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub on_hold_time: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub closed_desc: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub closed_date: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub closed_time: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub corrective_action: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub corrective_action_date: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub corrective_action_time: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub preventive_action: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub preventive_action_date: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub preventive_action_time: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub investigation: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub summary2: Option<Option<String>>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl IncidentPatch {
    pub(crate) fn nullable_columns(&self) -> [(&'static str, &Option<Option<String>>); 18] {
        [
            ("incident_area_night", &self.incident_area_night),
            ("investigated_by", &self.investigated_by),
            ("assigned_category", &self.assigned_category),
            ("assigned_staff", &self.assigned_staff),
            ("on_hold_desc", &self.on_hold_desc),
            ("on_hold_date", &self.on_hold_date),
            ("on_hold_time", &self.on_hold_time),
            ("closed_desc", &self.closed_desc),
            ("closed_date", &self.closed_date),
            ("closed_time", &self.closed_time),
            ("corrective_action", &self.corrective_action),
            ("corrective_action_date", &self.corrective_action_date),
            ("corrective_action_time", &self.corrective_action_time),
            ("preventive_action", &self.preventive_action),
            ("preventive_action_date", &self.preventive_action_date),
            ("preventive_action_time", &self.preventive_action_time),
            ("investigation", &self.investigation),
            ("summary2", &self.summary2),
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FacilityRow {
    pub facility_id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InvestigatorRow {
    pub login_name: String,
    pub display_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InvestigatorDetails {
    pub first_name: String,
    pub surname: String,
    pub email: Option<String>,
}
