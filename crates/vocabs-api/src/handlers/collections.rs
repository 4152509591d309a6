//! Collection handlers, including concept membership.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use vocabs_core::{
    Collection, ConceptSummary, CreateCollectionRequest, Error, Permission, PermissionTarget,
    UpdateCollectionRequest,
};
use vocabs_db::CollectionRepository;

use crate::{auth::AuthUser, error::ApiResult, handlers::require_permission, AppState};

pub async fn create_collection(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<CreateCollectionRequest>,
) -> ApiResult<(StatusCode, Json<Collection>)> {
    if req.name.trim().is_empty() {
        return Err(Error::InvalidInput("Collection name must not be empty".to_string()).into());
    }
    let collection = state.db.collections.create(req, Some(user.id)).await?;
    Ok((StatusCode::CREATED, Json(collection)))
}

/// Listing is scoped to one scheme.
#[derive(Debug, Deserialize)]
pub struct ListCollectionsQuery {
    pub scheme: Uuid,
}

pub async fn list_collections(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<ListCollectionsQuery>,
) -> ApiResult<Json<Vec<Collection>>> {
    require_permission(
        &state.db,
        Permission::View,
        user.id,
        PermissionTarget::ConceptScheme,
        params.scheme,
    )
    .await?;

    Ok(Json(
        state.db.collections.list_for_scheme(params.scheme).await?,
    ))
}

pub async fn get_collection(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Collection>> {
    require_permission(
        &state.db,
        Permission::View,
        user.id,
        PermissionTarget::Collection,
        id,
    )
    .await?;

    let collection = state
        .db
        .collections
        .get(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Collection not found: {}", id)))?;
    Ok(Json(collection))
}

pub async fn update_collection(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCollectionRequest>,
) -> ApiResult<Json<Collection>> {
    require_permission(
        &state.db,
        Permission::Change,
        user.id,
        PermissionTarget::Collection,
        id,
    )
    .await?;

    state.db.collections.update(id, req).await?;
    let collection = state
        .db
        .collections
        .get(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Collection not found: {}", id)))?;
    Ok(Json(collection))
}

pub async fn delete_collection(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require_permission(
        &state.db,
        Permission::Delete,
        user.id,
        PermissionTarget::Collection,
        id,
    )
    .await?;

    state.db.collections.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_members(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<ConceptSummary>>> {
    require_permission(
        &state.db,
        Permission::View,
        user.id,
        PermissionTarget::Collection,
        id,
    )
    .await?;

    Ok(Json(state.db.collections.members(id).await?))
}

pub async fn add_member(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((id, concept_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    require_permission(
        &state.db,
        Permission::Change,
        user.id,
        PermissionTarget::Collection,
        id,
    )
    .await?;

    state.db.collections.add_member(id, concept_id).await?;
    Ok(StatusCode::CREATED)
}

pub async fn remove_member(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((id, concept_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    require_permission(
        &state.db,
        Permission::Change,
        user.id,
        PermissionTarget::Collection,
        id,
    )
    .await?;

    state.db.collections.remove_member(id, concept_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
