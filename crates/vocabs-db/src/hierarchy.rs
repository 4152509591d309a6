//! Display-hierarchy resolution.
//!
//! Walks the singular `broader_concept_id` chain. The column carries no
//! acyclicity constraint, so every walk tracks visited ids and fails fast
//! with [`Error::CycleDetected`] instead of looping.

use std::collections::HashSet;
use std::time::Instant;

use sqlx::{PgPool, Row};
use tracing::debug;
use uuid::Uuid;

use vocabs_core::{ConceptPath, ConceptSummary, Error, Result};

/// Resolves label paths and descendant closures for the display hierarchy.
#[derive(Clone)]
pub struct HierarchyResolver {
    pool: PgPool,
}

impl HierarchyResolver {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Full label path for a concept: ancestor pref labels root-first,
    /// ending with the concept's own label.
    pub async fn label_path(&self, concept_id: Uuid) -> Result<ConceptPath> {
        let start = Instant::now();
        let mut visited = HashSet::new();
        let mut labels_leaf_first = Vec::new();
        let mut current = Some(concept_id);

        while let Some(id) = current {
            if !visited.insert(id) {
                return Err(Error::CycleDetected(id));
            }

            let row = sqlx::query(
                "SELECT pref_label, broader_concept_id FROM concept WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::ConceptNotFound(id))?;

            labels_leaf_first.push(row.get::<String, _>("pref_label"));
            current = row.get("broader_concept_id");
        }

        labels_leaf_first.reverse();

        debug!(
            subsystem = "hierarchy",
            component = "resolver",
            op = "label_path",
            concept_id = %concept_id,
            depth = labels_leaf_first.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Resolved label path"
        );
        Ok(ConceptPath::new(labels_leaf_first))
    }

    /// Ancestors of a concept root-first, excluding the concept itself.
    pub async fn ancestors(&self, concept_id: Uuid) -> Result<Vec<ConceptSummary>> {
        let mut visited = HashSet::new();
        visited.insert(concept_id);
        let mut chain = Vec::new();

        let mut current: Option<Uuid> =
            sqlx::query_scalar("SELECT broader_concept_id FROM concept WHERE id = $1")
                .bind(concept_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(Error::Database)?
                .ok_or(Error::ConceptNotFound(concept_id))?;

        while let Some(id) = current {
            if !visited.insert(id) {
                return Err(Error::CycleDetected(id));
            }

            let row = sqlx::query(
                r#"
                SELECT id, scheme_id, pref_label, notation, broader_concept_id
                FROM concept WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::ConceptNotFound(id))?;

            current = row.get("broader_concept_id");
            chain.push(ConceptSummary {
                id: row.get("id"),
                scheme_id: row.get("scheme_id"),
                pref_label: row.get("pref_label"),
                notation: row.get("notation"),
            });
        }

        chain.reverse();
        Ok(chain)
    }

    /// The concept and every descendant reachable through
    /// `broader_concept_id` pointers, depth-first.
    pub async fn descendants(&self, concept_id: Uuid) -> Result<Vec<ConceptSummary>> {
        let start = Instant::now();

        let root = sqlx::query(
            "SELECT id, scheme_id, pref_label, notation FROM concept WHERE id = $1",
        )
        .bind(concept_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or(Error::ConceptNotFound(concept_id))?;

        let mut visited = HashSet::new();
        visited.insert(concept_id);
        let mut result = vec![ConceptSummary {
            id: root.get("id"),
            scheme_id: root.get("scheme_id"),
            pref_label: root.get("pref_label"),
            notation: root.get("notation"),
        }];
        let mut stack = vec![concept_id];

        while let Some(parent) = stack.pop() {
            let rows = sqlx::query(
                r#"
                SELECT id, scheme_id, pref_label, notation
                FROM concept
                WHERE broader_concept_id = $1
                ORDER BY pref_label
                "#,
            )
            .bind(parent)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

            for row in rows {
                let id: Uuid = row.get("id");
                if !visited.insert(id) {
                    return Err(Error::CycleDetected(id));
                }
                result.push(ConceptSummary {
                    id,
                    scheme_id: row.get("scheme_id"),
                    pref_label: row.get("pref_label"),
                    notation: row.get("notation"),
                });
                stack.push(id);
            }
        }

        debug!(
            subsystem = "hierarchy",
            component = "resolver",
            op = "descendants",
            concept_id = %concept_id,
            result_count = result.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Resolved descendant closure"
        );
        Ok(result)
    }
}
