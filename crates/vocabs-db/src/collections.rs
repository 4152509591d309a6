//! Collection repository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use vocabs_core::{
    defaults, new_v7, Collection, ConceptSummary, CreateCollectionRequest, Error,
    PermissionTarget, Result, UpdateCollectionRequest,
};

use crate::cascade::PermissionCascade;

#[async_trait]
pub trait CollectionRepository: Send + Sync {
    /// Insert a collection; the permission cascade grants its creator and
    /// the scheme's curators access.
    async fn create(
        &self,
        req: CreateCollectionRequest,
        created_by: Option<Uuid>,
    ) -> Result<Collection>;

    async fn get(&self, id: Uuid) -> Result<Option<Collection>>;

    async fn list_for_scheme(&self, scheme_id: Uuid) -> Result<Vec<Collection>>;

    async fn update(&self, id: Uuid, req: UpdateCollectionRequest) -> Result<()>;

    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Concepts assigned to this collection.
    async fn members(&self, collection_id: Uuid) -> Result<Vec<ConceptSummary>>;

    async fn add_member(&self, collection_id: Uuid, concept_id: Uuid) -> Result<()>;

    async fn remove_member(&self, collection_id: Uuid, concept_id: Uuid) -> Result<()>;
}

#[derive(Clone)]
pub struct PgCollectionRepository {
    pool: PgPool,
}

impl PgCollectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const COLLECTION_COLUMNS: &str = r#"
    id, scheme_id, name, label_lang, creator, contributor,
    legacy_id, created_at, updated_at, created_by
"#;

fn row_to_collection(r: sqlx::postgres::PgRow) -> Collection {
    Collection {
        id: r.get("id"),
        scheme_id: r.get("scheme_id"),
        name: r.get("name"),
        label_lang: r.get("label_lang"),
        creator: r.get("creator"),
        contributor: r.get("contributor"),
        legacy_id: r.get("legacy_id"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
        created_by: r.get("created_by"),
    }
}

#[async_trait]
impl CollectionRepository for PgCollectionRepository {
    async fn create(
        &self,
        req: CreateCollectionRequest,
        created_by: Option<Uuid>,
    ) -> Result<Collection> {
        let id = new_v7();
        let label_lang = req.label_lang.unwrap_or_else(defaults::default_lang);

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO collection (
                id, scheme_id, name, label_lang, creator, contributor,
                legacy_id, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COLLECTION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(req.scheme_id)
        .bind(&req.name)
        .bind(&label_lang)
        .bind(req.creator.as_deref().unwrap_or(""))
        .bind(req.contributor.as_deref().unwrap_or(""))
        .bind(req.legacy_id.as_deref().unwrap_or(""))
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::Database)?;

        PermissionCascade::object_created(
            &mut tx,
            PermissionTarget::Collection,
            id,
            created_by,
            req.scheme_id,
        )
        .await?;

        tx.commit().await.map_err(Error::Database)?;
        Ok(row_to_collection(row))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Collection>> {
        let row = sqlx::query(&format!(
            "SELECT {COLLECTION_COLUMNS} FROM collection WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(row_to_collection))
    }

    async fn list_for_scheme(&self, scheme_id: Uuid) -> Result<Vec<Collection>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLLECTION_COLUMNS} FROM collection WHERE scheme_id = $1 ORDER BY name"
        ))
        .bind(scheme_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(row_to_collection).collect())
    }

    async fn update(&self, id: Uuid, req: UpdateCollectionRequest) -> Result<()> {
        let now = Utc::now();

        let mut updates = vec!["updated_at = $1".to_string()];
        let mut param_idx = 2;

        if req.name.is_some() {
            updates.push(format!("name = ${}", param_idx));
            param_idx += 1;
        }
        if req.label_lang.is_some() {
            updates.push(format!("label_lang = ${}", param_idx));
            param_idx += 1;
        }
        if req.creator.is_some() {
            updates.push(format!("creator = ${}", param_idx));
            param_idx += 1;
        }
        if req.contributor.is_some() {
            updates.push(format!("contributor = ${}", param_idx));
            param_idx += 1;
        }

        let query = format!(
            "UPDATE collection SET {} WHERE id = ${}",
            updates.join(", "),
            param_idx
        );

        let mut q = sqlx::query(&query).bind(now);

        if let Some(ref v) = req.name {
            q = q.bind(v);
        }
        if let Some(ref v) = req.label_lang {
            q = q.bind(v);
        }
        if let Some(ref v) = req.creator {
            q = q.bind(v);
        }
        if let Some(ref v) = req.contributor {
            q = q.bind(v);
        }

        let result = q
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Collection not found: {}", id)));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        sqlx::query("DELETE FROM object_permission WHERE target_type = 'collection' AND object_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        let result = sqlx::query("DELETE FROM collection WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Collection not found: {}", id)));
        }

        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn members(&self, collection_id: Uuid) -> Result<Vec<ConceptSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.scheme_id, c.pref_label, c.notation
            FROM collection_member cm
            JOIN concept c ON c.id = cm.concept_id
            WHERE cm.collection_id = $1
            ORDER BY c.pref_label
            "#,
        )
        .bind(collection_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| ConceptSummary {
                id: r.get("id"),
                scheme_id: r.get("scheme_id"),
                pref_label: r.get("pref_label"),
                notation: r.get("notation"),
            })
            .collect())
    }

    async fn add_member(&self, collection_id: Uuid, concept_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO collection_member (collection_id, concept_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(collection_id)
        .bind(concept_id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    async fn remove_member(&self, collection_id: Uuid, concept_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM collection_member WHERE collection_id = $1 AND concept_id = $2")
            .bind(collection_id)
            .bind(concept_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }
}
