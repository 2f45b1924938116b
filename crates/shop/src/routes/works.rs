//! Catalog route handlers.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use atelier_core::WorkId;

use super::Path;
use crate::db::Store;
use crate::error::Result;
use crate::models::{Work, WorkInput};
use crate::services::CatalogService;
use crate::state::AppState;

/// List all works, oldest first.
pub async fn index<S: Store>(State(state): State<AppState<S>>) -> Result<Json<Vec<Work>>> {
    let works = CatalogService::new(state.store()).list_works().await?;
    Ok(Json(works))
}

/// Create a work from raw input.
pub async fn create<S: Store>(
    State(state): State<AppState<S>>,
    payload: std::result::Result<Json<WorkInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Work>)> {
    let Json(input) = payload?;
    let work = CatalogService::new(state.store()).create_work(input).await?;
    Ok((StatusCode::CREATED, Json(work)))
}

/// Show one work.
pub async fn show<S: Store>(
    State(state): State<AppState<S>>,
    Path(work_id): Path<WorkId>,
) -> Result<Json<Work>> {
    let work = CatalogService::new(state.store()).get_work(work_id).await?;
    Ok(Json(work))
}

/// Replace a work's fields.
pub async fn update<S: Store>(
    State(state): State<AppState<S>>,
    Path(work_id): Path<WorkId>,
    payload: std::result::Result<Json<WorkInput>, JsonRejection>,
) -> Result<Json<Work>> {
    let Json(input) = payload?;
    let work = CatalogService::new(state.store())
        .update_work(work_id, input)
        .await?;
    Ok(Json(work))
}

/// Delete a work.
pub async fn destroy<S: Store>(
    State(state): State<AppState<S>>,
    Path(work_id): Path<WorkId>,
) -> Result<StatusCode> {
    CatalogService::new(state.store()).delete_work(work_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
