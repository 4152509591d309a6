//! Lexical label repository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use vocabs_core::{
    new_v7, CreateLabelRequest, Error, Label, LabelType, PermissionTarget, Result,
    UpdateLabelRequest,
};

use crate::cascade::PermissionCascade;

#[async_trait]
pub trait LabelRepository: Send + Sync {
    /// Insert a label; the permission cascade grants its creator and the
    /// scheme's curators access.
    async fn create(&self, req: CreateLabelRequest, created_by: Option<Uuid>) -> Result<Label>;

    async fn get(&self, id: Uuid) -> Result<Option<Label>>;

    async fn list_for_scheme(&self, scheme_id: Uuid) -> Result<Vec<Label>>;

    async fn update(&self, id: Uuid, req: UpdateLabelRequest) -> Result<()>;

    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[derive(Clone)]
pub struct PgLabelRepository {
    pool: PgPool,
}

impl PgLabelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const LABEL_COLUMNS: &str = r#"
    id, scheme_id, name, label_type, iso_code, created_at, updated_at, created_by
"#;

pub(crate) fn row_to_label(r: sqlx::postgres::PgRow) -> Result<Label> {
    Ok(Label {
        id: r.get("id"),
        scheme_id: r.get("scheme_id"),
        name: r.get("name"),
        label_type: r
            .get::<String, _>("label_type")
            .parse()
            .map_err(Error::Internal)?,
        iso_code: r.get("iso_code"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
        created_by: r.get("created_by"),
    })
}

#[async_trait]
impl LabelRepository for PgLabelRepository {
    async fn create(&self, req: CreateLabelRequest, created_by: Option<Uuid>) -> Result<Label> {
        let id = new_v7();
        let label_type = req.label_type.unwrap_or(LabelType::AltLabel);

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO label (id, scheme_id, name, label_type, iso_code, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {LABEL_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(req.scheme_id)
        .bind(&req.name)
        .bind(label_type.to_string())
        .bind(req.iso_code.as_deref().unwrap_or(""))
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::Database)?;

        PermissionCascade::object_created(
            &mut tx,
            PermissionTarget::Label,
            id,
            created_by,
            req.scheme_id,
        )
        .await?;

        tx.commit().await.map_err(Error::Database)?;
        row_to_label(row)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Label>> {
        let row = sqlx::query(&format!("SELECT {LABEL_COLUMNS} FROM label WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        row.map(row_to_label).transpose()
    }

    async fn list_for_scheme(&self, scheme_id: Uuid) -> Result<Vec<Label>> {
        let rows = sqlx::query(&format!(
            "SELECT {LABEL_COLUMNS} FROM label WHERE scheme_id = $1 ORDER BY name"
        ))
        .bind(scheme_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter().map(row_to_label).collect()
    }

    async fn update(&self, id: Uuid, req: UpdateLabelRequest) -> Result<()> {
        let now = Utc::now();

        let mut updates = vec!["updated_at = $1".to_string()];
        let mut param_idx = 2;

        if req.name.is_some() {
            updates.push(format!("name = ${}", param_idx));
            param_idx += 1;
        }
        if req.label_type.is_some() {
            updates.push(format!("label_type = ${}", param_idx));
            param_idx += 1;
        }
        if req.iso_code.is_some() {
            updates.push(format!("iso_code = ${}", param_idx));
            param_idx += 1;
        }

        let query = format!(
            "UPDATE label SET {} WHERE id = ${}",
            updates.join(", "),
            param_idx
        );

        let mut q = sqlx::query(&query).bind(now);

        if let Some(ref v) = req.name {
            q = q.bind(v);
        }
        if let Some(v) = req.label_type {
            q = q.bind(v.to_string());
        }
        if let Some(ref v) = req.iso_code {
            q = q.bind(v);
        }

        let result = q
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Label not found: {}", id)));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        sqlx::query("DELETE FROM object_permission WHERE target_type = 'label' AND object_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        let result = sqlx::query("DELETE FROM label WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Label not found: {}", id)));
        }

        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }
}
