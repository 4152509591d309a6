//! Permission cascade hooks.
//!
//! Every entity write that affects who may see or edit vocabulary objects
//! calls one of these hooks inside its own transaction, so the entity row
//! and its derived grants commit or roll back together. The rules:
//!
//! - Creating a scheme grants delete/change/view on it to its creator.
//! - Creating a child object (collection, concept, label) grants all three
//!   on it to its creator and to every current curator of its scheme. For
//!   each curator who is not the scheme's creator, the scheme creator is
//!   granted all three on the object as well, so creators never lose sight
//!   of objects added under curated schemes.
//! - Adding curators grants all three on the scheme and on every existing
//!   child object of the scheme.
//! - Removing curators revokes view and change on the scheme but leaves
//!   delete in place (a removed curator can still be allowed to clean up
//!   schemes they once managed), and revokes all three on child objects.
//!
//! Rows with no recorded creator produce no creator grants. All grants go
//! through [`PgPermissionStore`], so replaying a hook is harmless.

use std::time::Instant;

use sqlx::{Postgres, Row, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use vocabs_core::{Error, Permission, PermissionTarget, Result, ALL_PERMISSIONS};

use crate::permissions::PgPermissionStore;

/// Cascade hook entry points. Stateless; all methods run inside the
/// caller's transaction.
pub struct PermissionCascade;

/// A scheme's child objects, gathered once per curator-change hook.
struct ChildObjects {
    collections: Vec<Uuid>,
    concepts: Vec<Uuid>,
    labels: Vec<Uuid>,
}

impl ChildObjects {
    fn count(&self) -> usize {
        self.collections.len() + self.concepts.len() + self.labels.len()
    }

    fn iter(&self) -> impl Iterator<Item = (PermissionTarget, Uuid)> + '_ {
        let collections = self
            .collections
            .iter()
            .map(|id| (PermissionTarget::Collection, *id));
        let concepts = self
            .concepts
            .iter()
            .map(|id| (PermissionTarget::Concept, *id));
        let labels = self.labels.iter().map(|id| (PermissionTarget::Label, *id));
        collections.chain(concepts).chain(labels)
    }
}

impl PermissionCascade {
    /// Hook for a freshly inserted concept scheme.
    pub async fn scheme_created(
        tx: &mut Transaction<'_, Postgres>,
        scheme_id: Uuid,
        created_by: Option<Uuid>,
    ) -> Result<()> {
        let Some(creator) = created_by else {
            debug!(
                subsystem = "perm",
                component = "cascade",
                op = "scheme_created",
                scheme_id = %scheme_id,
                "Scheme has no creator; no grants written"
            );
            return Ok(());
        };

        for perm in ALL_PERMISSIONS {
            PgPermissionStore::assign_tx(
                tx,
                perm,
                creator,
                PermissionTarget::ConceptScheme,
                scheme_id,
            )
            .await?;
        }

        info!(
            subsystem = "perm",
            component = "cascade",
            op = "scheme_created",
            scheme_id = %scheme_id,
            user_id = %creator,
            grant_count = ALL_PERMISSIONS.len(),
            "Granted scheme permissions to creator"
        );
        Ok(())
    }

    /// Hook for a freshly inserted child object of a scheme.
    pub async fn object_created(
        tx: &mut Transaction<'_, Postgres>,
        target: PermissionTarget,
        object_id: Uuid,
        created_by: Option<Uuid>,
        scheme_id: Uuid,
    ) -> Result<()> {
        let start = Instant::now();
        let mut grant_count = 0usize;

        if let Some(creator) = created_by {
            for perm in ALL_PERMISSIONS {
                PgPermissionStore::assign_tx(tx, perm, creator, target, object_id).await?;
                grant_count += 1;
            }
        }

        let scheme_creator = scheme_created_by(tx, scheme_id).await?;
        let curators = scheme_curators(tx, scheme_id).await?;

        for curator in &curators {
            for perm in ALL_PERMISSIONS {
                PgPermissionStore::assign_tx(tx, perm, *curator, target, object_id).await?;
                grant_count += 1;
            }
            // Schemes are usually curated by people other than their
            // creator; keep the creator's access current as objects land.
            if let Some(creator) = scheme_creator {
                if *curator != creator {
                    for perm in ALL_PERMISSIONS {
                        PgPermissionStore::assign_tx(tx, perm, creator, target, object_id).await?;
                        grant_count += 1;
                    }
                }
            }
        }

        info!(
            subsystem = "perm",
            component = "cascade",
            op = "object_created",
            target = %target,
            object_id = %object_id,
            scheme_id = %scheme_id,
            grant_count,
            duration_ms = start.elapsed().as_millis() as u64,
            "Granted object permissions"
        );
        Ok(())
    }

    /// Hook for users added as curators of a scheme. Each gains all three
    /// permissions on the scheme and on every existing child object.
    pub async fn curators_added(
        tx: &mut Transaction<'_, Postgres>,
        scheme_id: Uuid,
        user_ids: &[Uuid],
    ) -> Result<()> {
        if user_ids.is_empty() {
            return Ok(());
        }
        let start = Instant::now();
        let children = child_objects(tx, scheme_id).await?;
        let mut grant_count = 0usize;

        for user_id in user_ids {
            for perm in ALL_PERMISSIONS {
                PgPermissionStore::assign_tx(
                    tx,
                    perm,
                    *user_id,
                    PermissionTarget::ConceptScheme,
                    scheme_id,
                )
                .await?;
                grant_count += 1;
            }
            for (target, object_id) in children.iter() {
                for perm in ALL_PERMISSIONS {
                    PgPermissionStore::assign_tx(tx, perm, *user_id, target, object_id).await?;
                    grant_count += 1;
                }
            }
        }

        info!(
            subsystem = "perm",
            component = "cascade",
            op = "curators_added",
            scheme_id = %scheme_id,
            user_count = user_ids.len(),
            child_count = children.count(),
            grant_count,
            duration_ms = start.elapsed().as_millis() as u64,
            "Granted curator permissions"
        );
        Ok(())
    }

    /// Hook for users removed as curators. View and change on the scheme
    /// are revoked; scheme delete is deliberately kept. All three go away
    /// on child objects.
    pub async fn curators_removed(
        tx: &mut Transaction<'_, Postgres>,
        scheme_id: Uuid,
        user_ids: &[Uuid],
    ) -> Result<()> {
        if user_ids.is_empty() {
            return Ok(());
        }
        let start = Instant::now();
        let children = child_objects(tx, scheme_id).await?;

        for user_id in user_ids {
            for perm in [Permission::View, Permission::Change] {
                PgPermissionStore::revoke_tx(
                    tx,
                    perm,
                    *user_id,
                    PermissionTarget::ConceptScheme,
                    scheme_id,
                )
                .await?;
            }
            for (target, object_id) in children.iter() {
                for perm in ALL_PERMISSIONS {
                    PgPermissionStore::revoke_tx(tx, perm, *user_id, target, object_id).await?;
                }
            }
        }

        info!(
            subsystem = "perm",
            component = "cascade",
            op = "curators_removed",
            scheme_id = %scheme_id,
            user_count = user_ids.len(),
            child_count = children.count(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Revoked curator permissions"
        );
        Ok(())
    }
}

async fn scheme_created_by(
    tx: &mut Transaction<'_, Postgres>,
    scheme_id: Uuid,
) -> Result<Option<Uuid>> {
    let row = sqlx::query("SELECT created_by FROM concept_scheme WHERE id = $1")
        .bind(scheme_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(Error::Database)?
        .ok_or(Error::SchemeNotFound(scheme_id))?;
    Ok(row.get("created_by"))
}

async fn scheme_curators(
    tx: &mut Transaction<'_, Postgres>,
    scheme_id: Uuid,
) -> Result<Vec<Uuid>> {
    let rows = sqlx::query("SELECT user_id FROM scheme_curator WHERE scheme_id = $1")
        .bind(scheme_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(Error::Database)?;
    Ok(rows.into_iter().map(|r| r.get("user_id")).collect())
}

async fn child_objects(
    tx: &mut Transaction<'_, Postgres>,
    scheme_id: Uuid,
) -> Result<ChildObjects> {
    let collections = sqlx::query("SELECT id FROM collection WHERE scheme_id = $1")
        .bind(scheme_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(Error::Database)?
        .into_iter()
        .map(|r| r.get("id"))
        .collect();
    let concepts = sqlx::query("SELECT id FROM concept WHERE scheme_id = $1")
        .bind(scheme_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(Error::Database)?
        .into_iter()
        .map(|r| r.get("id"))
        .collect();
    let labels = sqlx::query("SELECT id FROM label WHERE scheme_id = $1")
        .bind(scheme_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(Error::Database)?
        .into_iter()
        .map(|r| r.get("id"))
        .collect();

    Ok(ChildObjects {
        collections,
        concepts,
        labels,
    })
}
