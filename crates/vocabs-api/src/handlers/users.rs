//! Editor account handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use vocabs_core::{CreateUserRequest, Error, User};
use vocabs_db::UserRepository;

use crate::{auth::AuthUser, error::ApiResult, AppState};

pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    if req.username.trim().is_empty() {
        return Err(Error::InvalidInput("Username must not be empty".to_string()).into());
    }
    let user = state.db.users.create(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Optional exact-username filter for the listing.
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub username: Option<String>,
}

pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Query(params): Query<ListUsersQuery>,
) -> ApiResult<Json<Vec<User>>> {
    let users = match params.username.as_deref() {
        Some(username) => state
            .db
            .users
            .get_by_username(username)
            .await?
            .into_iter()
            .collect(),
        None => state.db.users.list().await?,
    };
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<User>> {
    let user = state
        .db
        .users
        .get(id)
        .await?
        .ok_or(Error::UserNotFound(id))?;
    Ok(Json(user))
}

pub async fn deactivate_user(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.db.users.deactivate(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Deleting an account nulls its `created_by` references; grants go with
/// the user row.
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.db.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
