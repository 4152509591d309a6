//! Object-level permission types.
//!
//! Permission grants are keyed by (user, target kind, object id,
//! permission). They are the side effect of the permission cascade, not a
//! first-class entity: the cascade writes them on entity creation and on
//! curator membership changes, and the autocomplete layer reads them to
//! scope visible objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named capability on a single object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    View,
    Change,
    Delete,
}

/// All three capabilities, in grant order.
pub const ALL_PERMISSIONS: [Permission; 3] = [
    Permission::Delete,
    Permission::Change,
    Permission::View,
];

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::View => write!(f, "view"),
            Self::Change => write!(f, "change"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

impl std::str::FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "view" => Ok(Self::View),
            "change" => Ok(Self::Change),
            "delete" => Ok(Self::Delete),
            _ => Err(format!("Invalid permission: {}", s)),
        }
    }
}

/// The kind of object a grant applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionTarget {
    ConceptScheme,
    Collection,
    Concept,
    Label,
}

impl std::fmt::Display for PermissionTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConceptScheme => write!(f, "conceptscheme"),
            Self::Collection => write!(f, "collection"),
            Self::Concept => write!(f, "concept"),
            Self::Label => write!(f, "label"),
        }
    }
}

impl std::str::FromStr for PermissionTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "conceptscheme" => Ok(Self::ConceptScheme),
            "collection" => Ok(Self::Collection),
            "concept" => Ok(Self::Concept),
            "label" => Ok(Self::Label),
            _ => Err(format!("Invalid permission target: {}", s)),
        }
    }
}

/// A single grant row as read back from the permission store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub user_id: Uuid,
    pub target: PermissionTarget,
    pub object_id: Uuid,
    pub permission: Permission,
    pub granted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_permission_display_roundtrip() {
        for perm in ALL_PERMISSIONS {
            let parsed = Permission::from_str(&perm.to_string()).unwrap();
            assert_eq!(parsed, perm);
        }
    }

    #[test]
    fn test_permission_from_str_rejects_unknown() {
        assert!(Permission::from_str("admin").is_err());
    }

    #[test]
    fn test_target_display_codenames() {
        assert_eq!(PermissionTarget::ConceptScheme.to_string(), "conceptscheme");
        assert_eq!(PermissionTarget::Collection.to_string(), "collection");
        assert_eq!(PermissionTarget::Concept.to_string(), "concept");
        assert_eq!(PermissionTarget::Label.to_string(), "label");
    }

    #[test]
    fn test_target_from_str_case_insensitive() {
        assert_eq!(
            PermissionTarget::from_str("ConceptScheme").unwrap(),
            PermissionTarget::ConceptScheme
        );
    }

    #[test]
    fn test_all_permissions_covers_three_rights() {
        assert_eq!(ALL_PERMISSIONS.len(), 3);
        assert!(ALL_PERMISSIONS.contains(&Permission::View));
        assert!(ALL_PERMISSIONS.contains(&Permission::Change));
        assert!(ALL_PERMISSIONS.contains(&Permission::Delete));
    }
}
