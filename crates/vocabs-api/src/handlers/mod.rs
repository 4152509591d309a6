//! HTTP handlers for vocabs-api.

pub mod autocomplete;
pub mod collections;
pub mod concepts;
pub mod labels;
pub mod schemes;
pub mod users;

use uuid::Uuid;

use vocabs_core::{Error, Permission, PermissionTarget};
use vocabs_db::{Database, PermissionStore};

use crate::error::ApiResult;

/// Reject the request unless the user holds the permission on the object.
pub(crate) async fn require_permission(
    db: &Database,
    permission: Permission,
    user_id: Uuid,
    target: PermissionTarget,
    object_id: Uuid,
) -> ApiResult<()> {
    let allowed = db
        .permissions
        .has_permission(permission, user_id, target, object_id)
        .await?;

    if !allowed {
        return Err(Error::Forbidden(format!(
            "Missing {} permission on {} {}",
            permission, target, object_id
        ))
        .into());
    }
    Ok(())
}
