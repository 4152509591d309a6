//! Concept handlers: CRUD, hierarchy lookups, and relation edges.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vocabs_core::{
    Concept, ConceptRelation, ConceptRelationEdge, ConceptSummary, CreateConceptRequest, Error,
    Label, Permission, PermissionTarget, UpdateConceptRequest,
};
use vocabs_db::ConceptRepository;

use crate::{auth::AuthUser, error::ApiResult, handlers::require_permission, AppState};

pub async fn create_concept(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<CreateConceptRequest>,
) -> ApiResult<(StatusCode, Json<Concept>)> {
    if req.pref_label.trim().is_empty() {
        return Err(Error::InvalidInput("Concept pref_label must not be empty".to_string()).into());
    }
    let concept = state.db.concepts.create(req, Some(user.id)).await?;
    Ok((StatusCode::CREATED, Json(concept)))
}

/// Listing is scoped to one scheme; `top=true` restricts it to top
/// concepts (flagged or parentless).
#[derive(Debug, Deserialize)]
pub struct ListConceptsQuery {
    pub scheme: Uuid,
    #[serde(default)]
    pub top: bool,
}

pub async fn list_concepts(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<ListConceptsQuery>,
) -> ApiResult<Json<Vec<ConceptSummary>>> {
    require_permission(
        &state.db,
        Permission::View,
        user.id,
        PermissionTarget::ConceptScheme,
        params.scheme,
    )
    .await?;

    let concepts = if params.top {
        state.db.concepts.top_concepts(params.scheme).await?
    } else {
        state.db.concepts.list_for_scheme(params.scheme).await?
    };
    Ok(Json(concepts))
}

pub async fn get_concept(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Concept>> {
    require_permission(
        &state.db,
        Permission::View,
        user.id,
        PermissionTarget::Concept,
        id,
    )
    .await?;

    let concept = state
        .db
        .concepts
        .get(id)
        .await?
        .ok_or(Error::ConceptNotFound(id))?;
    Ok(Json(concept))
}

pub async fn update_concept(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateConceptRequest>,
) -> ApiResult<Json<Concept>> {
    require_permission(
        &state.db,
        Permission::Change,
        user.id,
        PermissionTarget::Concept,
        id,
    )
    .await?;

    state.db.concepts.update(id, req).await?;
    let concept = state
        .db
        .concepts
        .get(id)
        .await?
        .ok_or(Error::ConceptNotFound(id))?;
    Ok(Json(concept))
}

pub async fn delete_concept(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require_permission(
        &state.db,
        Permission::Delete,
        user.id,
        PermissionTarget::Concept,
        id,
    )
    .await?;

    state.db.concepts.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Rendered label path for a concept.
#[derive(Debug, Serialize, Deserialize)]
pub struct LabelPathResponse {
    pub labels: Vec<String>,
    pub path: String,
}

pub async fn concept_path(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LabelPathResponse>> {
    require_permission(
        &state.db,
        Permission::View,
        user.id,
        PermissionTarget::Concept,
        id,
    )
    .await?;

    let path = state.db.hierarchy.label_path(id).await?;
    Ok(Json(LabelPathResponse {
        labels: path.labels().to_vec(),
        path: path.as_str().to_string(),
    }))
}

pub async fn concept_descendants(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<ConceptSummary>>> {
    require_permission(
        &state.db,
        Permission::View,
        user.id,
        PermissionTarget::Concept,
        id,
    )
    .await?;

    Ok(Json(state.db.hierarchy.descendants(id).await?))
}

pub async fn concept_broader(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<ConceptSummary>>> {
    require_permission(
        &state.db,
        Permission::View,
        user.id,
        PermissionTarget::Concept,
        id,
    )
    .await?;

    Ok(Json(state.db.concepts.get_broader(id).await?))
}

pub async fn concept_narrower(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<ConceptSummary>>> {
    require_permission(
        &state.db,
        Permission::View,
        user.id,
        PermissionTarget::Concept,
        id,
    )
    .await?;

    Ok(Json(state.db.concepts.get_narrower(id).await?))
}

/// Relation edge payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct RelationRequest {
    pub object_id: Uuid,
    pub relation: ConceptRelation,
}

pub async fn list_relations(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<ConceptRelationEdge>>> {
    require_permission(
        &state.db,
        Permission::View,
        user.id,
        PermissionTarget::Concept,
        id,
    )
    .await?;

    Ok(Json(state.db.concepts.relations(id).await?))
}

pub async fn add_relation(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<RelationRequest>,
) -> ApiResult<StatusCode> {
    require_permission(
        &state.db,
        Permission::Change,
        user.id,
        PermissionTarget::Concept,
        id,
    )
    .await?;

    state
        .db
        .concepts
        .add_relation(id, req.object_id, req.relation)
        .await?;
    Ok(StatusCode::CREATED)
}

pub async fn remove_relation(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<RelationRequest>,
) -> ApiResult<StatusCode> {
    require_permission(
        &state.db,
        Permission::Change,
        user.id,
        PermissionTarget::Concept,
        id,
    )
    .await?;

    state
        .db
        .concepts
        .remove_relation(id, req.object_id, req.relation)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_other_labels(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Label>>> {
    require_permission(
        &state.db,
        Permission::View,
        user.id,
        PermissionTarget::Concept,
        id,
    )
    .await?;

    Ok(Json(state.db.concepts.other_labels(id).await?))
}

pub async fn add_other_label(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((id, label_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    require_permission(
        &state.db,
        Permission::Change,
        user.id,
        PermissionTarget::Concept,
        id,
    )
    .await?;

    state.db.concepts.add_other_label(id, label_id).await?;
    Ok(StatusCode::CREATED)
}

pub async fn remove_other_label(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((id, label_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    require_permission(
        &state.db,
        Permission::Change,
        user.id,
        PermissionTarget::Concept,
        id,
    )
    .await?;

    state.db.concepts.remove_other_label(id, label_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
