//! Per-object permission store.
//!
//! Grants are rows keyed by (user, target type, object id, permission).
//! `assign` and `revoke` are idempotent with respect to final state:
//! granting an already-held permission or revoking an absent one is a
//! no-op, not an error. Transaction-scoped variants let the permission
//! cascade compose grants with the entity write that triggered them.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use vocabs_core::{Error, Permission, PermissionGrant, PermissionTarget, Result};

/// Grant/revoke interface consumed by the cascade and the query layer.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Grant a permission on an object to a user. Idempotent.
    async fn assign(
        &self,
        permission: Permission,
        user_id: Uuid,
        target: PermissionTarget,
        object_id: Uuid,
    ) -> Result<()>;

    /// Revoke a permission on an object from a user. Idempotent.
    async fn revoke(
        &self,
        permission: Permission,
        user_id: Uuid,
        target: PermissionTarget,
        object_id: Uuid,
    ) -> Result<()>;

    /// Check whether a user holds a permission on an object.
    async fn has_permission(
        &self,
        permission: Permission,
        user_id: Uuid,
        target: PermissionTarget,
        object_id: Uuid,
    ) -> Result<bool>;

    /// Ids of all objects of one kind on which the user holds a permission.
    async fn objects_with_permission(
        &self,
        user_id: Uuid,
        permission: Permission,
        target: PermissionTarget,
    ) -> Result<Vec<Uuid>>;

    /// All grants currently recorded for one object.
    async fn grants_for_object(
        &self,
        target: PermissionTarget,
        object_id: Uuid,
    ) -> Result<Vec<PermissionGrant>>;
}

/// PostgreSQL permission store.
#[derive(Clone)]
pub struct PgPermissionStore {
    pool: PgPool,
}

impl PgPermissionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Grant within an external transaction. Idempotent via ON CONFLICT.
    pub async fn assign_tx(
        tx: &mut Transaction<'_, Postgres>,
        permission: Permission,
        user_id: Uuid,
        target: PermissionTarget,
        object_id: Uuid,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO object_permission (user_id, target_type, object_id, permission)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(target.to_string())
        .bind(object_id)
        .bind(permission.to_string())
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }

    /// Revoke within an external transaction. Absent rows are a no-op.
    pub async fn revoke_tx(
        tx: &mut Transaction<'_, Postgres>,
        permission: Permission,
        user_id: Uuid,
        target: PermissionTarget,
        object_id: Uuid,
    ) -> Result<()> {
        sqlx::query(
            r#"
            DELETE FROM object_permission
            WHERE user_id = $1 AND target_type = $2 AND object_id = $3 AND permission = $4
            "#,
        )
        .bind(user_id)
        .bind(target.to_string())
        .bind(object_id)
        .bind(permission.to_string())
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }
}

#[async_trait]
impl PermissionStore for PgPermissionStore {
    async fn assign(
        &self,
        permission: Permission,
        user_id: Uuid,
        target: PermissionTarget,
        object_id: Uuid,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        Self::assign_tx(&mut tx, permission, user_id, target, object_id).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn revoke(
        &self,
        permission: Permission,
        user_id: Uuid,
        target: PermissionTarget,
        object_id: Uuid,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        Self::revoke_tx(&mut tx, permission, user_id, target, object_id).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn has_permission(
        &self,
        permission: Permission,
        user_id: Uuid,
        target: PermissionTarget,
        object_id: Uuid,
    ) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM object_permission
                WHERE user_id = $1 AND target_type = $2
                  AND object_id = $3 AND permission = $4
            )
            "#,
        )
        .bind(user_id)
        .bind(target.to_string())
        .bind(object_id)
        .bind(permission.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(exists)
    }

    async fn objects_with_permission(
        &self,
        user_id: Uuid,
        permission: Permission,
        target: PermissionTarget,
    ) -> Result<Vec<Uuid>> {
        let rows = sqlx::query(
            r#"
            SELECT object_id FROM object_permission
            WHERE user_id = $1 AND target_type = $2 AND permission = $3
            ORDER BY object_id
            "#,
        )
        .bind(user_id)
        .bind(target.to_string())
        .bind(permission.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(|r| r.get("object_id")).collect())
    }

    async fn grants_for_object(
        &self,
        target: PermissionTarget,
        object_id: Uuid,
    ) -> Result<Vec<PermissionGrant>> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, target_type, object_id, permission, granted_at
            FROM object_permission
            WHERE target_type = $1 AND object_id = $2
            ORDER BY user_id, permission
            "#,
        )
        .bind(target.to_string())
        .bind(object_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter()
            .map(|r| {
                Ok(PermissionGrant {
                    user_id: r.get("user_id"),
                    target: r
                        .get::<String, _>("target_type")
                        .parse()
                        .map_err(Error::Internal)?,
                    object_id: r.get("object_id"),
                    permission: r
                        .get::<String, _>("permission")
                        .parse()
                        .map_err(Error::Internal)?,
                    granted_at: r.get("granted_at"),
                })
            })
            .collect()
    }
}
