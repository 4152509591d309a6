//! Header-based request authentication.
//!
//! Requests carry the acting editor's id in the `x-user-id` header. The
//! extractor resolves it against the user table and rejects missing
//! headers, malformed ids, unknown users, and deactivated accounts with
//! 401. Authorization (object permissions) is checked per handler.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use vocabs_core::{Error, User};
use vocabs_db::UserRepository;

use crate::{error::ApiError, AppState};

pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated editor behind the current request.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ApiError(Error::Unauthorized(format!(
                    "Missing {} header",
                    USER_ID_HEADER
                )))
            })?;

        let user_id: Uuid = raw.parse().map_err(|_| {
            ApiError(Error::Unauthorized(format!(
                "Malformed {} header",
                USER_ID_HEADER
            )))
        })?;

        let user = state
            .db
            .users
            .get_active(user_id)
            .await
            .map_err(|e| match e {
                Error::UserNotFound(id) => {
                    ApiError(Error::Unauthorized(format!("Unknown user: {}", id)))
                }
                other => ApiError(other),
            })?;

        Ok(AuthUser(user))
    }
}
