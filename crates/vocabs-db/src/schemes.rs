//! Concept scheme repository.
//!
//! Schemes are the unit of access control: creating one seeds the creator's
//! permissions, and changing the curator set fans grants out to (or pulls
//! them back from) every child object. Both happen here, inside the same
//! transaction as the row change.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use vocabs_core::{
    defaults, new_v7, ConceptScheme, ConceptSchemeSummary, CreateConceptSchemeRequest, Error,
    Result, UpdateConceptSchemeRequest, User,
};

use crate::cascade::PermissionCascade;

#[async_trait]
pub trait ConceptSchemeRepository: Send + Sync {
    /// Insert a scheme and grant its creator delete/change/view on it.
    async fn create(
        &self,
        req: CreateConceptSchemeRequest,
        created_by: Option<Uuid>,
    ) -> Result<ConceptScheme>;

    async fn get(&self, id: Uuid) -> Result<Option<ConceptScheme>>;

    async fn get_by_title(&self, title: &str) -> Result<Option<ConceptScheme>>;

    async fn list(&self) -> Result<Vec<ConceptSchemeSummary>>;

    async fn update(&self, id: Uuid, req: UpdateConceptSchemeRequest) -> Result<()>;

    /// Delete the scheme. Child objects and curator rows go with it.
    async fn delete(&self, id: Uuid) -> Result<()>;

    async fn curators(&self, scheme_id: Uuid) -> Result<Vec<User>>;

    /// Add curators; each gains full permissions on the scheme and all its
    /// existing child objects.
    async fn add_curators(&self, scheme_id: Uuid, user_ids: &[Uuid]) -> Result<()>;

    /// Remove curators; view/change on the scheme and all permissions on
    /// child objects are revoked. Scheme delete is kept.
    async fn remove_curators(&self, scheme_id: Uuid, user_ids: &[Uuid]) -> Result<()>;
}

#[derive(Clone)]
pub struct PgConceptSchemeRepository {
    pool: PgPool,
}

impl PgConceptSchemeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SCHEME_COLUMNS: &str = r#"
    id, title, title_lang, namespace, creator, contributor,
    description, description_lang, language, subject, coverage,
    version, publisher, source, rights, owner, relation_url,
    legacy_id, date_issued, created_at, updated_at, created_by
"#;

fn row_to_scheme(r: sqlx::postgres::PgRow) -> ConceptScheme {
    ConceptScheme {
        id: r.get("id"),
        title: r.get("title"),
        title_lang: r.get("title_lang"),
        namespace: r.get("namespace"),
        creator: r.get("creator"),
        contributor: r.get("contributor"),
        description: r.get("description"),
        description_lang: r.get("description_lang"),
        language: r.get("language"),
        subject: r.get("subject"),
        coverage: r.get("coverage"),
        version: r.get("version"),
        publisher: r.get("publisher"),
        source: r.get("source"),
        rights: r.get("rights"),
        owner: r.get("owner"),
        relation_url: r.get("relation_url"),
        legacy_id: r.get("legacy_id"),
        date_issued: r.get("date_issued"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
        created_by: r.get("created_by"),
    }
}

#[async_trait]
impl ConceptSchemeRepository for PgConceptSchemeRepository {
    async fn create(
        &self,
        req: CreateConceptSchemeRequest,
        created_by: Option<Uuid>,
    ) -> Result<ConceptScheme> {
        let id = new_v7();
        let namespace = req
            .namespace
            .unwrap_or_else(defaults::default_namespace);
        let title_lang = req.title_lang.unwrap_or_else(defaults::default_lang);
        let description_lang = req.description_lang.unwrap_or_else(defaults::default_lang);

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO concept_scheme (
                id, title, title_lang, namespace, creator, contributor,
                description, description_lang, language, subject, coverage,
                version, publisher, source, rights, owner, relation_url,
                legacy_id, date_issued, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            RETURNING {SCHEME_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&req.title)
        .bind(&title_lang)
        .bind(&namespace)
        .bind(req.creator.as_deref().unwrap_or(""))
        .bind(req.contributor.as_deref().unwrap_or(""))
        .bind(req.description.as_deref().unwrap_or(""))
        .bind(&description_lang)
        .bind(req.language.as_deref().unwrap_or(""))
        .bind(req.subject.as_deref().unwrap_or(""))
        .bind(req.coverage.as_deref().unwrap_or(""))
        .bind(req.version.as_deref().unwrap_or(""))
        .bind(req.publisher.as_deref().unwrap_or(""))
        .bind(req.source.as_deref().unwrap_or(""))
        .bind(req.rights.as_deref().unwrap_or(""))
        .bind(req.owner.as_deref().unwrap_or(""))
        .bind(req.relation_url.as_deref().unwrap_or(""))
        .bind(req.legacy_id.as_deref().unwrap_or(""))
        .bind(req.date_issued)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::Database)?;

        PermissionCascade::scheme_created(&mut tx, id, created_by).await?;

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "schemes",
            op = "create",
            scheme_id = %id,
            "Created concept scheme"
        );
        Ok(row_to_scheme(row))
    }

    async fn get(&self, id: Uuid) -> Result<Option<ConceptScheme>> {
        let row = sqlx::query(&format!(
            "SELECT {SCHEME_COLUMNS} FROM concept_scheme WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(row_to_scheme))
    }

    async fn get_by_title(&self, title: &str) -> Result<Option<ConceptScheme>> {
        let row = sqlx::query(&format!(
            "SELECT {SCHEME_COLUMNS} FROM concept_scheme WHERE title = $1 LIMIT 1"
        ))
        .bind(title)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(row_to_scheme))
    }

    async fn list(&self) -> Result<Vec<ConceptSchemeSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT s.id, s.title, s.version, s.updated_at, s.created_by,
                   COALESCE((SELECT COUNT(*) FROM concept WHERE scheme_id = s.id), 0) AS concept_count,
                   COALESCE((SELECT COUNT(*) FROM collection WHERE scheme_id = s.id), 0) AS collection_count,
                   COALESCE((SELECT COUNT(*) FROM label WHERE scheme_id = s.id), 0) AS label_count
            FROM concept_scheme s
            ORDER BY s.title
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| ConceptSchemeSummary {
                id: r.get("id"),
                title: r.get("title"),
                version: r.get("version"),
                concept_count: r.get("concept_count"),
                collection_count: r.get("collection_count"),
                label_count: r.get("label_count"),
                updated_at: r.get("updated_at"),
                created_by: r.get("created_by"),
            })
            .collect())
    }

    async fn update(&self, id: Uuid, req: UpdateConceptSchemeRequest) -> Result<()> {
        let now = Utc::now();

        // Build dynamic update query
        let mut updates = vec!["updated_at = $1".to_string()];
        let mut param_idx = 2;

        macro_rules! column {
            ($field:ident) => {
                if req.$field.is_some() {
                    updates.push(format!(concat!(stringify!($field), " = ${}"), param_idx));
                    param_idx += 1;
                }
            };
        }

        column!(title);
        column!(title_lang);
        column!(namespace);
        column!(creator);
        column!(contributor);
        column!(description);
        column!(language);
        column!(subject);
        column!(coverage);
        column!(version);
        column!(publisher);
        column!(source);
        column!(rights);
        column!(owner);
        column!(relation_url);
        column!(date_issued);

        let query = format!(
            "UPDATE concept_scheme SET {} WHERE id = ${}",
            updates.join(", "),
            param_idx
        );

        let mut q = sqlx::query(&query).bind(now);

        if let Some(ref v) = req.title {
            q = q.bind(v);
        }
        if let Some(ref v) = req.title_lang {
            q = q.bind(v);
        }
        if let Some(ref v) = req.namespace {
            q = q.bind(v);
        }
        if let Some(ref v) = req.creator {
            q = q.bind(v);
        }
        if let Some(ref v) = req.contributor {
            q = q.bind(v);
        }
        if let Some(ref v) = req.description {
            q = q.bind(v);
        }
        if let Some(ref v) = req.language {
            q = q.bind(v);
        }
        if let Some(ref v) = req.subject {
            q = q.bind(v);
        }
        if let Some(ref v) = req.coverage {
            q = q.bind(v);
        }
        if let Some(ref v) = req.version {
            q = q.bind(v);
        }
        if let Some(ref v) = req.publisher {
            q = q.bind(v);
        }
        if let Some(ref v) = req.source {
            q = q.bind(v);
        }
        if let Some(ref v) = req.rights {
            q = q.bind(v);
        }
        if let Some(ref v) = req.owner {
            q = q.bind(v);
        }
        if let Some(ref v) = req.relation_url {
            q = q.bind(v);
        }
        if let Some(v) = req.date_issued {
            q = q.bind(v);
        }

        let result = q
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::SchemeNotFound(id));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        // Grants are keyed by raw object id, so they do not cascade with
        // the foreign keys; sweep them for the scheme and its children.
        sqlx::query(
            r#"
            DELETE FROM object_permission
            WHERE (target_type = 'conceptscheme' AND object_id = $1)
               OR (target_type = 'collection' AND object_id IN
                   (SELECT id FROM collection WHERE scheme_id = $1))
               OR (target_type = 'concept' AND object_id IN
                   (SELECT id FROM concept WHERE scheme_id = $1))
               OR (target_type = 'label' AND object_id IN
                   (SELECT id FROM label WHERE scheme_id = $1))
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        let result = sqlx::query("DELETE FROM concept_scheme WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::SchemeNotFound(id));
        }

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "schemes",
            op = "delete",
            scheme_id = %id,
            "Deleted concept scheme"
        );
        Ok(())
    }

    async fn curators(&self, scheme_id: Uuid) -> Result<Vec<User>> {
        let rows = sqlx::query(
            r#"
            SELECT u.id, u.username, u.display_name, u.is_active, u.created_at
            FROM scheme_curator sc
            JOIN app_user u ON u.id = sc.user_id
            WHERE sc.scheme_id = $1
            ORDER BY u.username
            "#,
        )
        .bind(scheme_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| User {
                id: r.get("id"),
                username: r.get("username"),
                display_name: r.get("display_name"),
                is_active: r.get("is_active"),
                created_at: r.get("created_at"),
            })
            .collect())
    }

    async fn add_curators(&self, scheme_id: Uuid, user_ids: &[Uuid]) -> Result<()> {
        if user_ids.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        // Verify the scheme exists before writing memberships.
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM concept_scheme WHERE id = $1)")
                .bind(scheme_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(Error::Database)?;
        if !exists {
            return Err(Error::SchemeNotFound(scheme_id));
        }

        for user_id in user_ids {
            sqlx::query(
                r#"
                INSERT INTO scheme_curator (scheme_id, user_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(scheme_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
        }

        PermissionCascade::curators_added(&mut tx, scheme_id, user_ids).await?;

        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn remove_curators(&self, scheme_id: Uuid, user_ids: &[Uuid]) -> Result<()> {
        if user_ids.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        for user_id in user_ids {
            sqlx::query("DELETE FROM scheme_curator WHERE scheme_id = $1 AND user_id = $2")
                .bind(scheme_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .map_err(Error::Database)?;
        }

        PermissionCascade::curators_removed(&mut tx, scheme_id, user_ids).await?;

        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }
}
