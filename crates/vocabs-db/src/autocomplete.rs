//! Autocomplete queries backing the selection widgets.
//!
//! Most lookups are scoped to what the requesting user may view, via the
//! per-object permission grants. Substring matches are case-insensitive
//! ILIKE with escaped wildcards. Concept lookups that feed tagging widgets
//! expand their direct matches with the concepts sitting immediately below
//! them in the display hierarchy, so picking a broad term surfaces its
//! children too.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::debug;
use uuid::Uuid;

use vocabs_core::{
    defaults::PAGE_LIMIT_AUTOCOMPLETE, ConceptSchemeSummary, ConceptSummary, Error, Result, User,
};

use crate::escape_like;

#[async_trait]
pub trait AutocompleteRepository: Send + Sync {
    /// Viewable concepts, optionally narrowed to schemes whose title
    /// contains `scheme`. Returns direct label matches plus their immediate
    /// narrower concepts; without a query string the result is empty.
    async fn specific_concepts(
        &self,
        user_id: Uuid,
        scheme: Option<&str>,
        q: Option<&str>,
    ) -> Result<Vec<ConceptSummary>>;

    /// Unscoped concept lookup for constraint widgets. A scheme title that
    /// matches exactly restricts the result; an unknown title silently
    /// falls back to all concepts.
    async fn constraint_concepts(
        &self,
        scheme: Option<&str>,
        q: Option<&str>,
    ) -> Result<Vec<ConceptSummary>>;

    /// Viewable concepts with the narrower expansion; without a query
    /// string all viewable concepts are returned.
    async fn concepts(&self, user_id: Uuid, q: Option<&str>) -> Result<Vec<ConceptSummary>>;

    /// Broader-term picker: viewable concepts, optionally within one
    /// scheme, plain label match.
    async fn broader_candidates(
        &self,
        user_id: Uuid,
        scheme_id: Option<Uuid>,
        q: Option<&str>,
    ) -> Result<Vec<ConceptSummary>>;

    /// External-match picker: viewable concepts outside the given scheme.
    async fn external_match_candidates(
        &self,
        user_id: Uuid,
        scheme_id: Option<Uuid>,
        q: Option<&str>,
    ) -> Result<Vec<ConceptSummary>>;

    /// Distinct preferred labels containing the query, unscoped.
    async fn pref_labels(&self, q: &str) -> Result<Vec<String>>;

    /// Viewable concept schemes by title fragment.
    async fn schemes(&self, user_id: Uuid, q: Option<&str>) -> Result<Vec<ConceptSchemeSummary>>;

    /// Viewable collections by name fragment, optionally within one scheme.
    async fn collections(
        &self,
        user_id: Uuid,
        scheme_id: Option<Uuid>,
        q: Option<&str>,
    ) -> Result<Vec<CollectionHit>>;

    /// Users by username fragment, excluding the requester.
    async fn users(&self, requester_id: Uuid, q: Option<&str>) -> Result<Vec<User>>;
}

/// Collection autocomplete hit.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CollectionHit {
    pub id: Uuid,
    pub scheme_id: Uuid,
    pub name: String,
}

#[derive(Clone)]
pub struct PgAutocompleteRepository {
    pool: PgPool,
}

impl PgAutocompleteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn like_pattern(q: &str) -> String {
    format!("%{}%", escape_like(q))
}

fn row_to_summary(r: sqlx::postgres::PgRow) -> ConceptSummary {
    ConceptSummary {
        id: r.get("id"),
        scheme_id: r.get("scheme_id"),
        pref_label: r.get("pref_label"),
        notation: r.get("notation"),
    }
}

/// Visibility predicate fragment for concepts, binding the user id as the
/// given parameter.
macro_rules! concept_visible {
    ($param:literal) => {
        concat!(
            "EXISTS (SELECT 1 FROM object_permission op \
             WHERE op.user_id = ",
            $param,
            " AND op.target_type = 'concept' \
             AND op.object_id = c.id AND op.permission = 'view')"
        )
    };
}

#[async_trait]
impl AutocompleteRepository for PgAutocompleteRepository {
    async fn specific_concepts(
        &self,
        user_id: Uuid,
        scheme: Option<&str>,
        q: Option<&str>,
    ) -> Result<Vec<ConceptSummary>> {
        let Some(q) = q.filter(|q| !q.is_empty()) else {
            return Ok(Vec::new());
        };

        // A scheme fragment that matches nothing falls back to all
        // viewable concepts rather than an empty result.
        let scheme_ids: Vec<Uuid> = match scheme.filter(|s| !s.is_empty()) {
            Some(fragment) => sqlx::query_scalar(
                "SELECT id FROM concept_scheme WHERE title ILIKE $1",
            )
            .bind(like_pattern(fragment))
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?,
            None => Vec::new(),
        };

        let scheme_filter = if scheme_ids.is_empty() {
            ""
        } else {
            "AND c.scheme_id = ANY($3)"
        };

        let query = format!(
            r#"
            WITH direct_match AS (
                SELECT c.id, c.scheme_id, c.pref_label, c.notation
                FROM concept c
                WHERE {visible}
                  AND c.pref_label ILIKE $2
                  {scheme_filter}
            )
            SELECT id, scheme_id, pref_label, notation FROM direct_match
            UNION
            SELECT c.id, c.scheme_id, c.pref_label, c.notation
            FROM concept c
            WHERE {visible}
              AND c.broader_concept_id IN (SELECT id FROM direct_match)
            ORDER BY pref_label
            LIMIT {limit}
            "#,
            visible = concept_visible!("$1"),
            scheme_filter = scheme_filter,
            limit = PAGE_LIMIT_AUTOCOMPLETE,
        );

        let mut stmt = sqlx::query(&query).bind(user_id).bind(like_pattern(q));
        if !scheme_ids.is_empty() {
            stmt = stmt.bind(&scheme_ids);
        }

        let rows = stmt
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "autocomplete",
            op = "specific_concepts",
            query = %q,
            result_count = rows.len(),
            "Autocomplete lookup"
        );
        Ok(rows.into_iter().map(row_to_summary).collect())
    }

    async fn constraint_concepts(
        &self,
        scheme: Option<&str>,
        q: Option<&str>,
    ) -> Result<Vec<ConceptSummary>> {
        let scheme_id: Option<Uuid> = match scheme.filter(|s| !s.is_empty()) {
            Some(title) => sqlx::query_scalar(
                "SELECT id FROM concept_scheme WHERE title = $1 LIMIT 1",
            )
            .bind(title)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?,
            None => None,
        };

        let mut conditions = vec!["TRUE".to_string()];
        let mut param_idx = 1;
        if scheme_id.is_some() {
            conditions.push(format!("c.scheme_id = ${}", param_idx));
            param_idx += 1;
        }
        if q.is_some() {
            conditions.push(format!("c.pref_label ILIKE ${}", param_idx));
        }

        let query = format!(
            r#"
            SELECT c.id, c.scheme_id, c.pref_label, c.notation
            FROM concept c
            WHERE {}
            ORDER BY c.pref_label
            LIMIT {}
            "#,
            conditions.join(" AND "),
            PAGE_LIMIT_AUTOCOMPLETE,
        );

        let mut stmt = sqlx::query(&query);
        if let Some(id) = scheme_id {
            stmt = stmt.bind(id);
        }
        if let Some(q) = q {
            stmt = stmt.bind(like_pattern(q));
        }

        let rows = stmt
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows.into_iter().map(row_to_summary).collect())
    }

    async fn concepts(&self, user_id: Uuid, q: Option<&str>) -> Result<Vec<ConceptSummary>> {
        let rows = match q.filter(|q| !q.is_empty()) {
            Some(q) => {
                let query = format!(
                    r#"
                    WITH direct_match AS (
                        SELECT c.id, c.scheme_id, c.pref_label, c.notation
                        FROM concept c
                        WHERE {visible} AND c.pref_label ILIKE $2
                    )
                    SELECT id, scheme_id, pref_label, notation FROM direct_match
                    UNION
                    SELECT c.id, c.scheme_id, c.pref_label, c.notation
                    FROM concept c
                    WHERE {visible}
                      AND c.broader_concept_id IN (SELECT id FROM direct_match)
                    ORDER BY pref_label
                    LIMIT {limit}
                    "#,
                    visible = concept_visible!("$1"),
                    limit = PAGE_LIMIT_AUTOCOMPLETE,
                );
                sqlx::query(&query)
                    .bind(user_id)
                    .bind(like_pattern(q))
                    .fetch_all(&self.pool)
                    .await
                    .map_err(Error::Database)?
            }
            None => {
                let query = format!(
                    r#"
                    SELECT c.id, c.scheme_id, c.pref_label, c.notation
                    FROM concept c
                    WHERE {visible}
                    ORDER BY c.pref_label
                    LIMIT {limit}
                    "#,
                    visible = concept_visible!("$1"),
                    limit = PAGE_LIMIT_AUTOCOMPLETE,
                );
                sqlx::query(&query)
                    .bind(user_id)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(Error::Database)?
            }
        };

        Ok(rows.into_iter().map(row_to_summary).collect())
    }

    async fn broader_candidates(
        &self,
        user_id: Uuid,
        scheme_id: Option<Uuid>,
        q: Option<&str>,
    ) -> Result<Vec<ConceptSummary>> {
        self.scoped_concepts(user_id, scheme_id, q, false).await
    }

    async fn external_match_candidates(
        &self,
        user_id: Uuid,
        scheme_id: Option<Uuid>,
        q: Option<&str>,
    ) -> Result<Vec<ConceptSummary>> {
        self.scoped_concepts(user_id, scheme_id, q, true).await
    }

    async fn pref_labels(&self, q: &str) -> Result<Vec<String>> {
        let labels = sqlx::query_scalar(
            &format!(
                r#"
                SELECT DISTINCT pref_label
                FROM concept
                WHERE pref_label ILIKE $1
                ORDER BY pref_label
                LIMIT {}
                "#,
                PAGE_LIMIT_AUTOCOMPLETE
            ),
        )
        .bind(like_pattern(q))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(labels)
    }

    async fn schemes(&self, user_id: Uuid, q: Option<&str>) -> Result<Vec<ConceptSchemeSummary>> {
        let mut conditions = vec![
            "EXISTS (SELECT 1 FROM object_permission op \
             WHERE op.user_id = $1 AND op.target_type = 'conceptscheme' \
             AND op.object_id = s.id AND op.permission = 'view')"
                .to_string(),
        ];
        if q.is_some() {
            conditions.push("s.title ILIKE $2".to_string());
        }

        let query = format!(
            r#"
            SELECT s.id, s.title, s.version, s.updated_at, s.created_by,
                   COALESCE((SELECT COUNT(*) FROM concept WHERE scheme_id = s.id), 0) AS concept_count,
                   COALESCE((SELECT COUNT(*) FROM collection WHERE scheme_id = s.id), 0) AS collection_count,
                   COALESCE((SELECT COUNT(*) FROM label WHERE scheme_id = s.id), 0) AS label_count
            FROM concept_scheme s
            WHERE {}
            ORDER BY s.title
            LIMIT {}
            "#,
            conditions.join(" AND "),
            PAGE_LIMIT_AUTOCOMPLETE,
        );

        let mut stmt = sqlx::query(&query).bind(user_id);
        if let Some(q) = q {
            stmt = stmt.bind(like_pattern(q));
        }

        let rows = stmt
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

    async fn collections(
        &self,
        user_id: Uuid,
        scheme_id: Option<Uuid>,
        q: Option<&str>,
    ) -> Result<Vec<CollectionHit>> {
        let mut conditions = vec![
            "EXISTS (SELECT 1 FROM object_permission op \
             WHERE op.user_id = $1 AND op.target_type = 'collection' \
             AND op.object_id = col.id AND op.permission = 'view')"
                .to_string(),
        ];
        let mut param_idx = 2;
        if scheme_id.is_some() {
            conditions.push(format!("col.scheme_id = ${}", param_idx));
            param_idx += 1;
        }
        if q.is_some() {
            conditions.push(format!("col.name ILIKE ${}", param_idx));
        }

        let query = format!(
            r#"
            SELECT col.id, col.scheme_id, col.name
            FROM collection col
            WHERE {}
            ORDER BY col.name
            LIMIT {}
            "#,
            conditions.join(" AND "),
            PAGE_LIMIT_AUTOCOMPLETE,
        );

        let mut stmt = sqlx::query(&query).bind(user_id);
        if let Some(id) = scheme_id {
            stmt = stmt.bind(id);
        }
        if let Some(q) = q {
            stmt = stmt.bind(like_pattern(q));
        }

        let rows = stmt
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| CollectionHit {
                id: r.get("id"),
                scheme_id: r.get("scheme_id"),
                name: r.get("name"),
            })
            .collect())
    }

    async fn users(&self, requester_id: Uuid, q: Option<&str>) -> Result<Vec<User>> {
        let mut conditions = vec!["u.id <> $1".to_string()];
        if q.is_some() {
            conditions.push("u.username ILIKE $2".to_string());
        }

        let query = format!(
            r#"
            SELECT u.id, u.username, u.display_name, u.is_active, u.created_at
            FROM app_user u
            WHERE {}
            ORDER BY u.username
            LIMIT {}
            "#,
            conditions.join(" AND "),
            PAGE_LIMIT_AUTOCOMPLETE,
        );

        let mut stmt = sqlx::query(&query).bind(requester_id);
        if let Some(q) = q {
            stmt = stmt.bind(like_pattern(q));
        }

        let rows = stmt
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
}

impl PgAutocompleteRepository {
    /// Shared scoped lookup for the broader-term and external-match
    /// pickers; `exclude_scheme` flips the scheme filter from inclusion to
    /// exclusion.
    async fn scoped_concepts(
        &self,
        user_id: Uuid,
        scheme_id: Option<Uuid>,
        q: Option<&str>,
        exclude_scheme: bool,
    ) -> Result<Vec<ConceptSummary>> {
        let mut conditions = vec![concept_visible!("$1").to_string()];
        let mut param_idx = 2;
        if scheme_id.is_some() {
            let op = if exclude_scheme { "<>" } else { "=" };
            conditions.push(format!("c.scheme_id {} ${}", op, param_idx));
            param_idx += 1;
        }
        if q.is_some() {
            conditions.push(format!("c.pref_label ILIKE ${}", param_idx));
        }

        let query = format!(
            r#"
            SELECT c.id, c.scheme_id, c.pref_label, c.notation
            FROM concept c
            WHERE {}
            ORDER BY c.pref_label
            LIMIT {}
            "#,
            conditions.join(" AND "),
            PAGE_LIMIT_AUTOCOMPLETE,
        );

        let mut stmt = sqlx::query(&query).bind(user_id);
        if let Some(id) = scheme_id {
            stmt = stmt.bind(id);
        }
        if let Some(q) = q {
            stmt = stmt.bind(like_pattern(q));
        }

        let rows = stmt
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows.into_iter().map(row_to_summary).collect())
    }
}
