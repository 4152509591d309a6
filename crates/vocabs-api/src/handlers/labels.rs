//! Lexical label handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use vocabs_core::{
    CreateLabelRequest, Error, Label, Permission, PermissionTarget, UpdateLabelRequest,
};
use vocabs_db::LabelRepository;

use crate::{auth::AuthUser, error::ApiResult, handlers::require_permission, AppState};

pub async fn create_label(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<CreateLabelRequest>,
) -> ApiResult<(StatusCode, Json<Label>)> {
    if req.name.trim().is_empty() {
        return Err(Error::InvalidInput("Label name must not be empty".to_string()).into());
    }
    let label = state.db.labels.create(req, Some(user.id)).await?;
    Ok((StatusCode::CREATED, Json(label)))
}

/// Listing is scoped to one scheme.
#[derive(Debug, Deserialize)]
pub struct ListLabelsQuery {
    pub scheme: Uuid,
}

pub async fn list_labels(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<ListLabelsQuery>,
) -> ApiResult<Json<Vec<Label>>> {
    require_permission(
        &state.db,
        Permission::View,
        user.id,
        PermissionTarget::ConceptScheme,
        params.scheme,
    )
    .await?;

    Ok(Json(state.db.labels.list_for_scheme(params.scheme).await?))
}

pub async fn get_label(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Label>> {
    require_permission(
        &state.db,
        Permission::View,
        user.id,
        PermissionTarget::Label,
        id,
    )
    .await?;

    let label = state
        .db
        .labels
        .get(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Label not found: {}", id)))?;
    Ok(Json(label))
}

pub async fn update_label(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateLabelRequest>,
) -> ApiResult<Json<Label>> {
    require_permission(
        &state.db,
        Permission::Change,
        user.id,
        PermissionTarget::Label,
        id,
    )
    .await?;

    state.db.labels.update(id, req).await?;
    let label = state
        .db
        .labels
        .get(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Label not found: {}", id)))?;
    Ok(Json(label))
}

pub async fn delete_label(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require_permission(
        &state.db,
        Permission::Delete,
        user.id,
        PermissionTarget::Label,
        id,
    )
    .await?;

    state.db.labels.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
