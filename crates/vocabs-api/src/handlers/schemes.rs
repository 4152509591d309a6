//! Concept scheme handlers, including curator membership.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vocabs_core::{
    ConceptScheme, ConceptSchemeSummary, CreateConceptSchemeRequest, Error, Permission,
    PermissionTarget, UpdateConceptSchemeRequest, User,
};
use vocabs_db::ConceptSchemeRepository;

use crate::{auth::AuthUser, error::ApiResult, handlers::require_permission, AppState};

pub async fn create_scheme(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<CreateConceptSchemeRequest>,
) -> ApiResult<(StatusCode, Json<ConceptScheme>)> {
    if req.title.trim().is_empty() {
        return Err(Error::InvalidInput("Scheme title must not be empty".to_string()).into());
    }
    let scheme = state.db.schemes.create(req, Some(user.id)).await?;
    Ok((StatusCode::CREATED, Json(scheme)))
}

pub async fn list_schemes(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
) -> ApiResult<Json<Vec<ConceptSchemeSummary>>> {
    Ok(Json(state.db.schemes.list().await?))
}

pub async fn get_scheme(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ConceptScheme>> {
    require_permission(
        &state.db,
        Permission::View,
        user.id,
        PermissionTarget::ConceptScheme,
        id,
    )
    .await?;

    let scheme = state
        .db
        .schemes
        .get(id)
        .await?
        .ok_or(Error::SchemeNotFound(id))?;
    Ok(Json(scheme))
}

pub async fn update_scheme(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateConceptSchemeRequest>,
) -> ApiResult<Json<ConceptScheme>> {
    require_permission(
        &state.db,
        Permission::Change,
        user.id,
        PermissionTarget::ConceptScheme,
        id,
    )
    .await?;

    state.db.schemes.update(id, req).await?;
    let scheme = state
        .db
        .schemes
        .get(id)
        .await?
        .ok_or(Error::SchemeNotFound(id))?;
    Ok(Json(scheme))
}

pub async fn delete_scheme(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require_permission(
        &state.db,
        Permission::Delete,
        user.id,
        PermissionTarget::ConceptScheme,
        id,
    )
    .await?;

    state.db.schemes.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Curator membership change payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct CuratorsRequest {
    pub user_ids: Vec<Uuid>,
}

pub async fn list_curators(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<User>>> {
    require_permission(
        &state.db,
        Permission::View,
        user.id,
        PermissionTarget::ConceptScheme,
        id,
    )
    .await?;

    Ok(Json(state.db.schemes.curators(id).await?))
}

pub async fn add_curators(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<CuratorsRequest>,
) -> ApiResult<Json<Vec<User>>> {
    require_permission(
        &state.db,
        Permission::Change,
        user.id,
        PermissionTarget::ConceptScheme,
        id,
    )
    .await?;

    state.db.schemes.add_curators(id, &req.user_ids).await?;
    Ok(Json(state.db.schemes.curators(id).await?))
}

pub async fn remove_curators(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<CuratorsRequest>,
) -> ApiResult<Json<Vec<User>>> {
    require_permission(
        &state.db,
        Permission::Change,
        user.id,
        PermissionTarget::ConceptScheme,
        id,
    )
    .await?;

    state.db.schemes.remove_curators(id, &req.user_ids).await?;
    Ok(Json(state.db.schemes.curators(id).await?))
}
