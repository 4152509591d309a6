//! Autocomplete handlers backing the selection widgets.
//!
//! Concept results carry the rendered label path so a widget can show
//! "Animal >> Mammal >> Dog" instead of a bare "Dog".

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vocabs_core::{ConceptSchemeSummary, User};
use vocabs_db::{AutocompleteRepository, CollectionHit};

use crate::{auth::AuthUser, error::ApiResult, AppState};

/// Query parameters shared by the scheme-title-filtered lookups.
#[derive(Debug, Deserialize)]
pub struct TitleScopedQuery {
    pub q: Option<String>,
    /// Scheme title (fragment or exact, depending on the endpoint).
    pub scheme: Option<String>,
}

/// Query parameters for the id-filtered concept pickers.
#[derive(Debug, Deserialize)]
pub struct SchemeScopedQuery {
    pub q: Option<String>,
    pub scheme: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct PlainQuery {
    pub q: Option<String>,
}

/// A concept hit with its display path.
#[derive(Debug, Serialize)]
pub struct ConceptHit {
    pub id: Uuid,
    pub scheme_id: Uuid,
    pub pref_label: String,
    pub notation: String,
    pub path: String,
}

async fn with_paths(
    state: &AppState,
    hits: Vec<vocabs_core::ConceptSummary>,
) -> ApiResult<Vec<ConceptHit>> {
    let mut out = Vec::with_capacity(hits.len());
    for hit in hits {
        let path = state.db.hierarchy.label_path(hit.id).await?;
        out.push(ConceptHit {
            id: hit.id,
            scheme_id: hit.scheme_id,
            pref_label: hit.pref_label,
            notation: hit.notation,
            path: path.as_str().to_string(),
        });
    }
    Ok(out)
}

pub async fn ac_concepts(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<TitleScopedQuery>,
) -> ApiResult<Json<Vec<ConceptHit>>> {
    let hits = match params.scheme.as_deref() {
        Some(scheme) => {
            state
                .db
                .autocomplete
                .specific_concepts(user.id, Some(scheme), params.q.as_deref())
                .await?
        }
        None => {
            state
                .db
                .autocomplete
                .concepts(user.id, params.q.as_deref())
                .await?
        }
    };
    Ok(Json(with_paths(&state, hits).await?))
}

pub async fn ac_concepts_unscoped(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Query(params): Query<TitleScopedQuery>,
) -> ApiResult<Json<Vec<vocabs_core::ConceptSummary>>> {
    let hits = state
        .db
        .autocomplete
        .constraint_concepts(params.scheme.as_deref(), params.q.as_deref())
        .await?;
    Ok(Json(hits))
}

pub async fn ac_broader(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<SchemeScopedQuery>,
) -> ApiResult<Json<Vec<ConceptHit>>> {
    let hits = state
        .db
        .autocomplete
        .broader_candidates(user.id, params.scheme, params.q.as_deref())
        .await?;
    Ok(Json(with_paths(&state, hits).await?))
}

pub async fn ac_external_match(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<SchemeScopedQuery>,
) -> ApiResult<Json<Vec<ConceptHit>>> {
    let hits = state
        .db
        .autocomplete
        .external_match_candidates(user.id, params.scheme, params.q.as_deref())
        .await?;
    Ok(Json(with_paths(&state, hits).await?))
}

pub async fn ac_pref_labels(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Query(params): Query<PlainQuery>,
) -> ApiResult<Json<Vec<String>>> {
    let q = params.q.unwrap_or_default();
    if q.is_empty() {
        return Ok(Json(Vec::new()));
    }
    Ok(Json(state.db.autocomplete.pref_labels(&q).await?))
}

pub async fn ac_schemes(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<PlainQuery>,
) -> ApiResult<Json<Vec<ConceptSchemeSummary>>> {
    Ok(Json(
        state
            .db
            .autocomplete
            .schemes(user.id, params.q.as_deref())
            .await?,
    ))
}

pub async fn ac_collections(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<SchemeScopedQuery>,
) -> ApiResult<Json<Vec<CollectionHit>>> {
    Ok(Json(
        state
            .db
            .autocomplete
            .collections(user.id, params.scheme, params.q.as_deref())
            .await?,
    ))
}

pub async fn ac_users(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<PlainQuery>,
) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(
        state
            .db
            .autocomplete
            .users(user.id, params.q.as_deref())
            .await?,
    ))
}
