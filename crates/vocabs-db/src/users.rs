//! Editor account repository.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use vocabs_core::{new_v7, CreateUserRequest, Error, Result, User};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, req: CreateUserRequest) -> Result<User>;
    async fn get(&self, id: Uuid) -> Result<Option<User>>;
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn list(&self) -> Result<Vec<User>>;
    /// Load a user and require that the account is active. Used by request
    /// authentication.
    async fn get_active(&self, id: Uuid) -> Result<User>;
    async fn deactivate(&self, id: Uuid) -> Result<()>;
    /// Delete the account. `created_by` references elsewhere become null.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_user(r: sqlx::postgres::PgRow) -> User {
    User {
        id: r.get("id"),
        username: r.get("username"),
        display_name: r.get("display_name"),
        is_active: r.get("is_active"),
        created_at: r.get("created_at"),
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, req: CreateUserRequest) -> Result<User> {
        let id = new_v7();

        let row = sqlx::query(
            r#"
            INSERT INTO app_user (id, username, display_name)
            VALUES ($1, $2, $3)
            RETURNING id, username, display_name, is_active, created_at
            "#,
        )
        .bind(id)
        .bind(&req.username)
        .bind(&req.display_name)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row_to_user(row))
    }

    async fn get(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, display_name, is_active, created_at FROM app_user WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(row_to_user))
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, display_name, is_active, created_at
            FROM app_user
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(row_to_user))
    }

    async fn list(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(
            r#"
            SELECT id, username, display_name, is_active, created_at
            FROM app_user
            ORDER BY username
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(row_to_user).collect())
    }

    async fn get_active(&self, id: Uuid) -> Result<User> {
        let user = self.get(id).await?.ok_or(Error::UserNotFound(id))?;
        if !user.is_active {
            return Err(Error::Unauthorized(format!(
                "User account is inactive: {}",
                id
            )));
        }
        Ok(user)
    }

    async fn deactivate(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("UPDATE app_user SET is_active = FALSE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::UserNotFound(id));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM app_user WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::UserNotFound(id));
        }
        Ok(())
    }
}
