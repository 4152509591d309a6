//! Display-hierarchy label paths.
//!
//! A concept's full label is its ancestor chain rendered root-to-leaf and
//! joined with [`PATH_SEPARATOR`], e.g. `"Animal >> Mammal >> Dog"`. The
//! chain itself is resolved from the database by
//! `vocabs_db::hierarchy::HierarchyResolver`; this module holds the pure
//! joining logic and the per-instance memo.

use once_cell::sync::OnceCell;

/// Separator between ancestor labels in a rendered path.
pub const PATH_SEPARATOR: &str = crate::defaults::LABEL_PATH_SEPARATOR;

/// Join ancestor labels (root first, the concept's own label last) into a
/// display path.
pub fn join_label_path<S: AsRef<str>>(labels: &[S]) -> String {
    labels
        .iter()
        .map(|l| l.as_ref())
        .collect::<Vec<_>>()
        .join(PATH_SEPARATOR)
}

/// Ancestor-label sequence for one concept, with the joined path memoized
/// for the lifetime of the instance.
///
/// The joined string is computed lazily on first access and cached;
/// [`ConceptPath::invalidate`] drops the memo so a changed chain is
/// re-rendered on next access.
#[derive(Debug, Clone)]
pub struct ConceptPath {
    /// Labels in root-to-leaf order; the last entry is the concept itself.
    labels: Vec<String>,
    joined: OnceCell<String>,
}

impl ConceptPath {
    /// Build a path from labels in root-to-leaf order.
    pub fn new(labels: Vec<String>) -> Self {
        Self {
            labels,
            joined: OnceCell::new(),
        }
    }

    /// Labels in root-to-leaf order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// The rendered path, computed once per instance.
    pub fn as_str(&self) -> &str {
        self.joined.get_or_init(|| join_label_path(&self.labels))
    }

    /// Replace the ancestor chain and drop the memoized rendering.
    pub fn invalidate(&mut self, labels: Vec<String>) {
        self.labels = labels;
        self.joined = OnceCell::new();
    }
}

impl std::fmt::Display for ConceptPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_label_path_chain() {
        let labels = ["Animal", "Mammal", "Dog"];
        assert_eq!(join_label_path(&labels), "Animal >> Mammal >> Dog");
    }

    #[test]
    fn test_join_label_path_single_label_has_no_separator() {
        assert_eq!(join_label_path(&["Animal"]), "Animal");
    }

    #[test]
    fn test_concept_path_memoizes() {
        let path = ConceptPath::new(vec!["Animal".into(), "Mammal".into()]);
        let first = path.as_str() as *const str;
        let second = path.as_str() as *const str;
        assert_eq!(first, second);
        assert_eq!(path.as_str(), "Animal >> Mammal");
    }

    #[test]
    fn test_concept_path_invalidate_recomputes() {
        let mut path = ConceptPath::new(vec!["Animal".into(), "Mammal".into(), "Dog".into()]);
        assert_eq!(path.as_str(), "Animal >> Mammal >> Dog");

        path.invalidate(vec!["Animal".into(), "Bird".into()]);
        assert_eq!(path.as_str(), "Animal >> Bird");
    }

    #[test]
    fn test_concept_path_display() {
        let path = ConceptPath::new(vec!["Animal".into()]);
        assert_eq!(format!("{}", path), "Animal");
    }
}
