//! Concept repository.
//!
//! Covers the concept rows themselves, the typed semantic relation edges
//! between concepts, and the attached other-labels. The singular
//! `broader_concept_id` display pointer is walked by the hierarchy
//! resolver, not here.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::debug;
use uuid::Uuid;

use vocabs_core::{
    defaults, new_v7, slugify, Concept, ConceptRelation, ConceptRelationEdge, ConceptSummary,
    CreateConceptRequest, Error, Label, PermissionTarget, Result, UpdateConceptRequest,
};

use crate::cascade::PermissionCascade;

#[async_trait]
pub trait ConceptRepository: Send + Sync {
    /// Insert a concept; a blank notation is slugged from the pref label
    /// and de-duplicated within the scheme with a numeric suffix. The
    /// permission cascade grants its creator and the scheme's curators
    /// access.
    async fn create(&self, req: CreateConceptRequest, created_by: Option<Uuid>)
        -> Result<Concept>;

    async fn get(&self, id: Uuid) -> Result<Option<Concept>>;

    async fn list_for_scheme(&self, scheme_id: Uuid) -> Result<Vec<ConceptSummary>>;

    /// Top concepts of a scheme: flagged ones plus those with no broader
    /// pointer.
    async fn top_concepts(&self, scheme_id: Uuid) -> Result<Vec<ConceptSummary>>;

    async fn update(&self, id: Uuid, req: UpdateConceptRequest) -> Result<()>;

    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Add a typed relation edge. Idempotent.
    async fn add_relation(
        &self,
        subject_id: Uuid,
        object_id: Uuid,
        relation: ConceptRelation,
    ) -> Result<()>;

    async fn remove_relation(
        &self,
        subject_id: Uuid,
        object_id: Uuid,
        relation: ConceptRelation,
    ) -> Result<()>;

    /// All outgoing edges for a concept.
    async fn relations(&self, concept_id: Uuid) -> Result<Vec<ConceptRelationEdge>>;

    /// Concepts broader than this one: targets of its `broader` edges
    /// unioned with sources of `narrower` edges pointing at it.
    async fn get_broader(&self, concept_id: Uuid) -> Result<Vec<ConceptSummary>>;

    /// Concepts narrower than this one: targets of its `narrower` edges
    /// unioned with sources of `broader` edges pointing at it.
    async fn get_narrower(&self, concept_id: Uuid) -> Result<Vec<ConceptSummary>>;

    /// Labels attached to a concept as other labels.
    async fn other_labels(&self, concept_id: Uuid) -> Result<Vec<Label>>;

    async fn add_other_label(&self, concept_id: Uuid, label_id: Uuid) -> Result<()>;

    async fn remove_other_label(&self, concept_id: Uuid, label_id: Uuid) -> Result<()>;
}

#[derive(Clone)]
pub struct PgConceptRepository {
    pool: PgPool,
}

impl PgConceptRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const CONCEPT_COLUMNS: &str = r#"
    id, scheme_id, pref_label, pref_label_lang, definition, definition_lang,
    notation, broader_concept_id, top_concept, same_as_external,
    source_description, creator, legacy_id, created_at, updated_at, created_by
"#;

fn row_to_concept(r: sqlx::postgres::PgRow) -> Concept {
    Concept {
        id: r.get("id"),
        scheme_id: r.get("scheme_id"),
        pref_label: r.get("pref_label"),
        pref_label_lang: r.get("pref_label_lang"),
        definition: r.get("definition"),
        definition_lang: r.get("definition_lang"),
        notation: r.get("notation"),
        broader_concept_id: r.get("broader_concept_id"),
        top_concept: r.get("top_concept"),
        same_as_external: r.get("same_as_external"),
        source_description: r.get("source_description"),
        creator: r.get("creator"),
        legacy_id: r.get("legacy_id"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
        created_by: r.get("created_by"),
    }
}

fn row_to_summary(r: sqlx::postgres::PgRow) -> ConceptSummary {
    ConceptSummary {
        id: r.get("id"),
        scheme_id: r.get("scheme_id"),
        pref_label: r.get("pref_label"),
        notation: r.get("notation"),
    }
}

/// Find a notation unused within the scheme, starting from the slugged
/// label and appending `-2`, `-3`, ... as needed.
async fn dedup_notation(
    tx: &mut Transaction<'_, Postgres>,
    scheme_id: Uuid,
    base: &str,
) -> Result<String> {
    let mut candidate = base.to_string();
    let mut suffix = 2u32;

    loop {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM concept WHERE scheme_id = $1 AND notation = $2)",
        )
        .bind(scheme_id)
        .bind(&candidate)
        .fetch_one(&mut **tx)
        .await
        .map_err(Error::Database)?;

        if !taken {
            return Ok(candidate);
        }
        candidate = format!("{}-{}", base, suffix);
        suffix += 1;
    }
}

#[async_trait]
impl ConceptRepository for PgConceptRepository {
    async fn create(
        &self,
        req: CreateConceptRequest,
        created_by: Option<Uuid>,
    ) -> Result<Concept> {
        let id = new_v7();
        let pref_label_lang = req.pref_label_lang.unwrap_or_else(defaults::default_lang);
        let definition_lang = req.definition_lang.unwrap_or_else(defaults::default_lang);

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let notation = match req.notation.filter(|n| !n.is_empty()) {
            Some(n) => n,
            None => {
                let base = slugify(&req.pref_label);
                dedup_notation(&mut tx, req.scheme_id, &base).await?
            }
        };

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO concept (
                id, scheme_id, pref_label, pref_label_lang, definition,
                definition_lang, notation, broader_concept_id, top_concept,
                same_as_external, source_description, creator, legacy_id,
                created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {CONCEPT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(req.scheme_id)
        .bind(&req.pref_label)
        .bind(&pref_label_lang)
        .bind(req.definition.as_deref().unwrap_or(""))
        .bind(&definition_lang)
        .bind(&notation)
        .bind(req.broader_concept_id)
        .bind(req.top_concept)
        .bind(req.same_as_external.as_deref().unwrap_or(""))
        .bind(req.source_description.as_deref().unwrap_or(""))
        .bind(req.creator.as_deref().unwrap_or(""))
        .bind(req.legacy_id.as_deref().unwrap_or(""))
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::Database)?;

        PermissionCascade::object_created(
            &mut tx,
            PermissionTarget::Concept,
            id,
            created_by,
            req.scheme_id,
        )
        .await?;

        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "concepts",
            op = "create",
            concept_id = %id,
            scheme_id = %req.scheme_id,
            notation = %notation,
            "Created concept"
        );
        Ok(row_to_concept(row))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Concept>> {
        let row = sqlx::query(&format!(
            "SELECT {CONCEPT_COLUMNS} FROM concept WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(row_to_concept))
    }

    async fn list_for_scheme(&self, scheme_id: Uuid) -> Result<Vec<ConceptSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT id, scheme_id, pref_label, notation
            FROM concept
            WHERE scheme_id = $1
            ORDER BY pref_label
            "#,
        )
        .bind(scheme_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(row_to_summary).collect())
    }

    async fn top_concepts(&self, scheme_id: Uuid) -> Result<Vec<ConceptSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT id, scheme_id, pref_label, notation
            FROM concept
            WHERE scheme_id = $1
              AND (top_concept = TRUE OR broader_concept_id IS NULL)
            ORDER BY pref_label
            "#,
        )
        .bind(scheme_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(row_to_summary).collect())
    }

    async fn update(&self, id: Uuid, req: UpdateConceptRequest) -> Result<()> {
        let now = Utc::now();

        let mut updates = vec!["updated_at = $1".to_string()];
        let mut param_idx = 2;

        if req.pref_label.is_some() {
            updates.push(format!("pref_label = ${}", param_idx));
            param_idx += 1;
        }
        if req.pref_label_lang.is_some() {
            updates.push(format!("pref_label_lang = ${}", param_idx));
            param_idx += 1;
        }
        if req.definition.is_some() {
            updates.push(format!("definition = ${}", param_idx));
            param_idx += 1;
        }
        if req.definition_lang.is_some() {
            updates.push(format!("definition_lang = ${}", param_idx));
            param_idx += 1;
        }
        if req.notation.is_some() {
            updates.push(format!("notation = ${}", param_idx));
            param_idx += 1;
        }
        // Outer Some means "set the pointer", inner None clears it.
        if req.broader_concept_id.is_some() {
            updates.push(format!("broader_concept_id = ${}", param_idx));
            param_idx += 1;
        }
        if req.top_concept.is_some() {
            updates.push(format!("top_concept = ${}", param_idx));
            param_idx += 1;
        }
        if req.same_as_external.is_some() {
            updates.push(format!("same_as_external = ${}", param_idx));
            param_idx += 1;
        }
        if req.source_description.is_some() {
            updates.push(format!("source_description = ${}", param_idx));
            param_idx += 1;
        }
        if req.creator.is_some() {
            updates.push(format!("creator = ${}", param_idx));
            param_idx += 1;
        }

        let query = format!(
            "UPDATE concept SET {} WHERE id = ${}",
            updates.join(", "),
            param_idx
        );

        let mut q = sqlx::query(&query).bind(now);

        if let Some(ref v) = req.pref_label {
            q = q.bind(v);
        }
        if let Some(ref v) = req.pref_label_lang {
            q = q.bind(v);
        }
        if let Some(ref v) = req.definition {
            q = q.bind(v);
        }
        if let Some(ref v) = req.definition_lang {
            q = q.bind(v);
        }
        if let Some(ref v) = req.notation {
            q = q.bind(v);
        }
        if let Some(v) = req.broader_concept_id {
            q = q.bind(v);
        }
        if let Some(v) = req.top_concept {
            q = q.bind(v);
        }
        if let Some(ref v) = req.same_as_external {
            q = q.bind(v);
        }
        if let Some(ref v) = req.source_description {
            q = q.bind(v);
        }
        if let Some(ref v) = req.creator {
            q = q.bind(v);
        }

        let result = q
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::ConceptNotFound(id));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        sqlx::query(
            "DELETE FROM object_permission WHERE target_type = 'concept' AND object_id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        let result = sqlx::query("DELETE FROM concept WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::ConceptNotFound(id));
        }

        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn add_relation(
        &self,
        subject_id: Uuid,
        object_id: Uuid,
        relation: ConceptRelation,
    ) -> Result<()> {
        if subject_id == object_id {
            return Err(Error::InvalidInput(
                "A concept cannot relate to itself".to_string(),
            ));
        }

        sqlx::query(
            r#"
            INSERT INTO concept_relation (subject_id, object_id, relation_type)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(subject_id)
        .bind(object_id)
        .bind(relation.to_string())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    async fn remove_relation(
        &self,
        subject_id: Uuid,
        object_id: Uuid,
        relation: ConceptRelation,
    ) -> Result<()> {
        sqlx::query(
            r#"
            DELETE FROM concept_relation
            WHERE subject_id = $1 AND object_id = $2 AND relation_type = $3
            "#,
        )
        .bind(subject_id)
        .bind(object_id)
        .bind(relation.to_string())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    async fn relations(&self, concept_id: Uuid) -> Result<Vec<ConceptRelationEdge>> {
        let rows = sqlx::query(
            r#"
            SELECT subject_id, object_id, relation_type, created_at
            FROM concept_relation
            WHERE subject_id = $1
            ORDER BY relation_type, object_id
            "#,
        )
        .bind(concept_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter()
            .map(|r| {
                Ok(ConceptRelationEdge {
                    subject_id: r.get("subject_id"),
                    object_id: r.get("object_id"),
                    relation: r
                        .get::<String, _>("relation_type")
                        .parse()
                        .map_err(Error::Internal)?,
                    created_at: r.get("created_at"),
                })
            })
            .collect()
    }

    async fn get_broader(&self, concept_id: Uuid) -> Result<Vec<ConceptSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.scheme_id, c.pref_label, c.notation
            FROM concept c
            JOIN concept_relation r ON r.object_id = c.id
            WHERE r.subject_id = $1 AND r.relation_type = 'broader'
            UNION
            SELECT c.id, c.scheme_id, c.pref_label, c.notation
            FROM concept c
            JOIN concept_relation r ON r.subject_id = c.id
            WHERE r.object_id = $1 AND r.relation_type = 'narrower'
            ORDER BY pref_label
            "#,
        )
        .bind(concept_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(row_to_summary).collect())
    }

    async fn get_narrower(&self, concept_id: Uuid) -> Result<Vec<ConceptSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.scheme_id, c.pref_label, c.notation
            FROM concept c
            JOIN concept_relation r ON r.object_id = c.id
            WHERE r.subject_id = $1 AND r.relation_type = 'narrower'
            UNION
            SELECT c.id, c.scheme_id, c.pref_label, c.notation
            FROM concept c
            JOIN concept_relation r ON r.subject_id = c.id
            WHERE r.object_id = $1 AND r.relation_type = 'broader'
            ORDER BY pref_label
            "#,
        )
        .bind(concept_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(row_to_summary).collect())
    }

    async fn other_labels(&self, concept_id: Uuid) -> Result<Vec<Label>> {
        let rows = sqlx::query(
            r#"
            SELECT l.id, l.scheme_id, l.name, l.label_type, l.iso_code,
                   l.created_at, l.updated_at, l.created_by
            FROM concept_other_label col
            JOIN label l ON l.id = col.label_id
            WHERE col.concept_id = $1
            ORDER BY l.name
            "#,
        )
        .bind(concept_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter().map(crate::labels::row_to_label).collect()
    }

    async fn add_other_label(&self, concept_id: Uuid, label_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO concept_other_label (concept_id, label_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(concept_id)
        .bind(label_id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    async fn remove_other_label(&self, concept_id: Uuid, label_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM concept_other_label WHERE concept_id = $1 AND label_id = $2")
            .bind(concept_id)
            .bind(label_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }
}
