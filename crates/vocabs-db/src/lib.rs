//! # vocabs-db
//!
//! PostgreSQL database layer for the vocabs SKOS editor.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for schemes, concepts, collections, labels
//!   and users
//! - The permission cascade that derives per-object grants from creators
//!   and scheme curators
//! - Display-hierarchy resolution (label paths, descendant closures)
//! - Permission-scoped autocomplete queries
//!
//! ## Example
//!
//! ```rust,ignore
//! use vocabs_db::{ConceptSchemeRepository, Database};
//! use vocabs_core::CreateConceptSchemeRequest;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/vocabs").await?;
//!
//!     let scheme = db
//!         .schemes
//!         .create(
//!             CreateConceptSchemeRequest {
//!                 title: "Monument Types".to_string(),
//!                 ..Default::default()
//!             },
//!             None,
//!         )
//!         .await?;
//!
//!     println!("Created scheme: {}", scheme.id);
//!     Ok(())
//! }
//! ```

pub mod autocomplete;
pub mod cascade;
pub mod collections;
pub mod concepts;
pub mod hierarchy;
pub mod labels;
pub mod permissions;
pub mod pool;
pub mod schemes;
pub mod users;

// Test fixtures for integration tests
// Note: always compiled so integration tests (in tests/) can use
// DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types so consumers only need this crate.
pub use vocabs_core::*;

/// Escape LIKE/ILIKE wildcards in user-supplied search input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

pub use autocomplete::{AutocompleteRepository, CollectionHit, PgAutocompleteRepository};
pub use cascade::PermissionCascade;
pub use collections::{CollectionRepository, PgCollectionRepository};
pub use concepts::{ConceptRepository, PgConceptRepository};
pub use hierarchy::HierarchyResolver;
pub use labels::{LabelRepository, PgLabelRepository};
pub use permissions::{PermissionStore, PgPermissionStore};
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use schemes::{ConceptSchemeRepository, PgConceptSchemeRepository};
pub use users::{PgUserRepository, UserRepository};

/// Aggregate handle bundling every repository over one shared pool.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Editor accounts.
    pub users: PgUserRepository,
    /// Concept schemes and curator membership.
    pub schemes: PgConceptSchemeRepository,
    /// Concepts, relation edges and other-labels.
    pub concepts: PgConceptRepository,
    /// Collections and their members.
    pub collections: PgCollectionRepository,
    /// Lexical labels.
    pub labels: PgLabelRepository,
    /// Per-object permission grants.
    pub permissions: PgPermissionStore,
    /// Display-hierarchy resolution.
    pub hierarchy: HierarchyResolver,
    /// Autocomplete lookups.
    pub autocomplete: PgAutocompleteRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            schemes: PgConceptSchemeRepository::new(pool.clone()),
            concepts: PgConceptRepository::new(pool.clone()),
            collections: PgCollectionRepository::new(pool.clone()),
            labels: PgLabelRepository::new(pool.clone()),
            permissions: PgPermissionStore::new(pool.clone()),
            hierarchy: HierarchyResolver::new(pool.clone()),
            autocomplete: PgAutocompleteRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Connect with a custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending schema migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Internal(format!("Migration failed: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("50%_done"), "50\\%\\_done");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("plain"), "plain");
    }
}
