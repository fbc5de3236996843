#![forbid(unsafe_code)]

use crate::extract::{JsonBody, PathParam, QueryParams};
use crate::{ApiError, AppState};
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use mims_storage::{
    CreatedIncident, EditedIncident, IncidentPatch, InvestigatorDetails, NewIncident,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// One dropdown entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub value: String,
    pub text: String,
}

impl Choice {
    fn same(value: String) -> Self {
        Self {
            text: value.clone(),
            value,
        }
    }
}

fn same_choices(values: Vec<String>) -> Vec<Choice> {
    values.into_iter().map(Choice::same).collect()
}

#[derive(Debug, Default, Deserialize)]
pub struct ParentQuery {
    #[serde(default)]
    parent: Option<String>,
}

pub async fn healthz(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.with_store(|_| Ok(())).await?;
    Ok(Json(json!({ "status": "ok" })))
}

pub async fn taxonomy_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Choice>>, ApiError> {
    let values = state.with_store(|store| store.top_categories()).await?;
    Ok(Json(same_choices(values)))
}

pub async fn taxonomy_subcategories(
    State(state): State<AppState>,
    PathParam(depth): PathParam<u8>,
    QueryParams(query): QueryParams<ParentQuery>,
) -> Result<Json<Vec<Choice>>, ApiError> {
    let parent = query.parent.unwrap_or_default();
    let values = state
        .with_store(move |store| store.subcategories(depth, &parent))
        .await?;
    Ok(Json(same_choices(values)))
}

pub async fn facilities(State(state): State<AppState>) -> Result<Json<Vec<Choice>>, ApiError> {
    let rows = state.with_store(|store| store.active_facilities()).await?;
    Ok(Json(
        rows.into_iter()
            .map(|row| Choice {
                value: row.facility_id,
                text: row.name,
            })
            .collect(),
    ))
}

pub async fn facility_departments(
    State(state): State<AppState>,
    PathParam(facility_id): PathParam<String>,
) -> Result<Json<Vec<Choice>>, ApiError> {
    let values = state
        .with_store(move |store| store.ward_departments(&facility_id))
        .await?;
    Ok(Json(same_choices(values)))
}

pub async fn facility_investigators(
    State(state): State<AppState>,
    PathParam(facility_id): PathParam<String>,
) -> Result<Json<Vec<Choice>>, ApiError> {
    let rows = state
        .with_store(move |store| store.investigators(&facility_id))
        .await?;
    Ok(Json(
        rows.into_iter()
            .map(|row| Choice {
                value: row.login_name,
                text: row.display_name,
            })
            .collect(),
    ))
}

pub async fn investigator_details(
    State(state): State<AppState>,
    PathParam(login_name): PathParam<String>,
) -> Result<Json<Option<InvestigatorDetails>>, ApiError> {
    let details = state
        .with_store(move |store| store.investigator_details(&login_name))
        .await?;
    Ok(Json(details))
}

pub async fn employee_departments(
    State(state): State<AppState>,
) -> Result<Json<Vec<Choice>>, ApiError> {
    let values = state.with_store(|store| store.employee_departments()).await?;
    Ok(Json(same_choices(values)))
}

pub async fn employee_categories(
    State(state): State<AppState>,
    PathParam(department): PathParam<String>,
) -> Result<Json<Vec<Choice>>, ApiError> {
    let values = state
        .with_store(move |store| store.employee_categories(&department))
        .await?;
    Ok(Json(same_choices(values)))
}

pub async fn create_incident(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<NewIncident>,
) -> Result<(StatusCode, Json<CreatedIncident>), ApiError> {
    let created = state
        .with_store(move |store| store.create_incident(request))
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn edit_incident(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    JsonBody(patch): JsonBody<IncidentPatch>,
) -> Result<Json<EditedIncident>, ApiError> {
    let edited = state
        .with_store(move |store| store.edit_incident(id, &patch))
        .await?;
    Ok(Json(edited))
}
