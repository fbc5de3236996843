#![forbid(unsafe_code)]

pub mod config;
mod error;
mod extract;
mod handlers;

pub use error::ApiError;
pub use handlers::Choice;

use axum::Router;
use axum::routing::{get, patch, post};
use mims_storage::{SqliteStore, StoreError};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// The only state shared between requests: where the database lives.
#[derive(Clone, Debug)]
pub struct AppState {
    storage_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage_dir: Arc::new(storage_dir.into()),
        }
    }

    /// Runs `op` against a store opened for this call only, off the async
    /// executor. The connection closes when `op` returns.
    pub async fn with_store<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteStore) -> Result<T, StoreError> + Send + 'static,
    {
        let storage_dir = Arc::clone(&self.storage_dir);
        let value = tokio::task::spawn_blocking(move || {
            let mut store = SqliteStore::open(storage_dir.as_path())?;
            op(&mut store)
        })
        .await??;
        Ok(value)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/taxonomy/categories", get(handlers::taxonomy_categories))
        .route(
            "/taxonomy/subcategories/:depth",
            get(handlers::taxonomy_subcategories),
        )
        .route("/facilities", get(handlers::facilities))
        .route(
            "/facilities/:facility_id/departments",
            get(handlers::facility_departments),
        )
        .route(
            "/facilities/:facility_id/investigators",
            get(handlers::facility_investigators),
        )
        .route("/investigators/:login_name", get(handlers::investigator_details))
        .route("/employee-categories", get(handlers::employee_departments))
        .route(
            "/employee-categories/:department",
            get(handlers::employee_categories),
        )
        .route("/incidents", post(handlers::create_incident))
        .route("/incidents/:id", patch(handlers::edit_incident))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
