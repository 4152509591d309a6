//! SKOS vocabulary entity types.
//!
//! Entities follow the SKOS data model: a concept scheme aggregates
//! concepts, collections, and lexical labels. Dublin-Core-style multi-value
//! fields (creator, contributor, language, subject, coverage) are stored as
//! semicolon-delimited text and split on demand.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// ENUMS
// =============================================================================

/// SKOS lexical label type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelType {
    PrefLabel,
    AltLabel,
    HiddenLabel,
}

impl std::fmt::Display for LabelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PrefLabel => write!(f, "prefLabel"),
            Self::AltLabel => write!(f, "altLabel"),
            Self::HiddenLabel => write!(f, "hiddenLabel"),
        }
    }
}

impl std::str::FromStr for LabelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prefLabel" => Ok(Self::PrefLabel),
            "altLabel" => Ok(Self::AltLabel),
            "hiddenLabel" => Ok(Self::HiddenLabel),
            _ => Err(format!("Invalid label type: {}", s)),
        }
    }
}

/// Directed semantic relation between two concepts.
///
/// `Broader` and `Narrower` are two independent edge sets, not one
/// symmetric relation with an implicit inverse. Sibling lookups must union
/// the direct edge set with the reverse lookup of the paired relation.
/// The five `*Match` variants link concepts across schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConceptRelation {
    Broader,
    Narrower,
    Related,
    BroadMatch,
    NarrowMatch,
    ExactMatch,
    RelatedMatch,
    CloseMatch,
}

impl std::fmt::Display for ConceptRelation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Broader => write!(f, "broader"),
            Self::Narrower => write!(f, "narrower"),
            Self::Related => write!(f, "related"),
            Self::BroadMatch => write!(f, "broad_match"),
            Self::NarrowMatch => write!(f, "narrow_match"),
            Self::ExactMatch => write!(f, "exact_match"),
            Self::RelatedMatch => write!(f, "related_match"),
            Self::CloseMatch => write!(f, "close_match"),
        }
    }
}

impl std::str::FromStr for ConceptRelation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "broader" => Ok(Self::Broader),
            "narrower" => Ok(Self::Narrower),
            "related" => Ok(Self::Related),
            "broad_match" | "broadmatch" => Ok(Self::BroadMatch),
            "narrow_match" | "narrowmatch" => Ok(Self::NarrowMatch),
            "exact_match" | "exactmatch" => Ok(Self::ExactMatch),
            "related_match" | "relatedmatch" => Ok(Self::RelatedMatch),
            "close_match" | "closematch" => Ok(Self::CloseMatch),
            _ => Err(format!("Invalid concept relation: {}", s)),
        }
    }
}

// =============================================================================
// USER
// =============================================================================

/// An editor account. Referenced by `created_by` fields (nullable, set to
/// null when the user is deleted) and by scheme curator memberships.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Request to create a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

// =============================================================================
// CONCEPT SCHEME
// =============================================================================

/// SKOS Concept Scheme - the top-level vocabulary container and the unit
/// of curator-based access control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptScheme {
    pub id: Uuid,

    /// dc:title.
    pub title: String,

    /// Language of the title (ISO 639).
    pub title_lang: String,

    /// Namespace URI for the scheme.
    pub namespace: String,

    /// dc:creator — semicolon-delimited person/organisation list.
    pub creator: String,

    /// dc:contributor — semicolon-delimited list.
    pub contributor: String,

    /// dc:description.
    pub description: String,

    /// Language of the description.
    pub description_lang: String,

    /// dc:language — semicolon-delimited language list.
    pub language: String,

    /// dc:subject — semicolon-delimited subject list.
    pub subject: String,

    /// dc:coverage — semicolon-delimited spatial/temporal coverage list.
    pub coverage: String,

    /// Current version string.
    pub version: String,

    /// dc:publisher.
    pub publisher: String,

    /// dc:source — resource the vocabulary is based on or derived from.
    pub source: String,

    /// dc:rights — license information.
    pub rights: String,

    /// Person or organisation owning rights for the vocabulary.
    pub owner: String,

    /// dc:relation — e.g. a related project website.
    pub relation_url: String,

    /// Identifier carried over from a legacy system.
    pub legacy_id: String,

    /// Date of official publication.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_issued: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Creating user; null once that user is deleted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Uuid>,
}

impl ConceptScheme {
    /// dc:creator entries, split on the semicolon delimiter.
    pub fn creator_list(&self) -> Vec<&str> {
        split_semicolon_list(&self.creator)
    }

    /// dc:contributor entries.
    pub fn contributor_list(&self) -> Vec<&str> {
        split_semicolon_list(&self.contributor)
    }

    /// dc:language entries.
    pub fn language_list(&self) -> Vec<&str> {
        split_semicolon_list(&self.language)
    }

    /// dc:subject entries.
    pub fn subject_list(&self) -> Vec<&str> {
        split_semicolon_list(&self.subject)
    }

    /// dc:coverage entries.
    pub fn coverage_list(&self) -> Vec<&str> {
        split_semicolon_list(&self.coverage)
    }
}

/// Summary view of a concept scheme for listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptSchemeSummary {
    pub id: Uuid,
    pub title: String,
    pub version: String,
    pub concept_count: i64,
    pub collection_count: i64,
    pub label_count: i64,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Uuid>,
}

/// Request to create a concept scheme.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateConceptSchemeRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_lang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contributor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_lang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rights: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legacy_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_issued: Option<NaiveDate>,
}

/// Request to update a concept scheme. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateConceptSchemeRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_lang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contributor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rights: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_issued: Option<NaiveDate>,
}

// =============================================================================
// COLLECTION
// =============================================================================

/// SKOS Collection - a labeled group of concepts within one scheme.
/// Inherits object permissions from its scheme's curator set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub id: Uuid,
    pub scheme_id: Uuid,

    /// skos:prefLabel for the collection.
    pub name: String,
    pub label_lang: String,

    /// dc:creator — semicolon-delimited list.
    pub creator: String,

    /// dc:contributor — semicolon-delimited list.
    pub contributor: String,

    pub legacy_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Uuid>,
}

impl Collection {
    pub fn creator_list(&self) -> Vec<&str> {
        split_semicolon_list(&self.creator)
    }

    pub fn contributor_list(&self) -> Vec<&str> {
        split_semicolon_list(&self.contributor)
    }
}

/// Request to create a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCollectionRequest {
    pub scheme_id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_lang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contributor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legacy_id: Option<String>,
}

/// Request to update a collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCollectionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_lang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contributor: Option<String>,
}

// =============================================================================
// CONCEPT
// =============================================================================

/// SKOS Concept - a unit of thought within a scheme.
///
/// `broader_concept_id` is the singular display-hierarchy pointer (a tree,
/// nullable, set to null when the parent is deleted). It is distinct from
/// the many-to-many `broader`/`narrower` semantic relations, which form a
/// general graph used for linking rather than display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Concept {
    pub id: Uuid,
    pub scheme_id: Uuid,

    /// skos:prefLabel.
    pub pref_label: String,
    pub pref_label_lang: String,

    /// skos:definition.
    pub definition: String,
    pub definition_lang: String,

    /// skos:notation — unique string identifying the concept within the
    /// vocabulary; slugged from the pref label when left blank.
    pub notation: String,

    /// Singular broader term for the display hierarchy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broader_concept_id: Option<Uuid>,

    /// Whether this concept is a top concept of its scheme.
    pub top_concept: bool,

    /// owl:sameAs — semicolon-delimited external URLs.
    pub same_as_external: String,

    /// Verbose description of the concept's source.
    pub source_description: String,

    /// dc:creator — semicolon-delimited list.
    pub creator: String,

    pub legacy_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Uuid>,
}

impl Concept {
    pub fn creator_list(&self) -> Vec<&str> {
        split_semicolon_list(&self.creator)
    }

    pub fn same_as_external_list(&self) -> Vec<&str> {
        split_semicolon_list(&self.same_as_external)
    }
}

/// Summary view of a concept for listings, relation sets, and autocomplete.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConceptSummary {
    pub id: Uuid,
    pub scheme_id: Uuid,
    pub pref_label: String,
    pub notation: String,
}

/// Request to create a concept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateConceptRequest {
    pub scheme_id: Uuid,
    pub pref_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pref_label_lang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition_lang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broader_concept_id: Option<Uuid>,
    #[serde(default)]
    pub top_concept: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub same_as_external: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legacy_id: Option<String>,
}

/// Maps a field that is present (possibly as JSON `null`) to `Some`, so a
/// nested-Option field keeps absent (`None`) apart from explicit null
/// (`Some(None)`).
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

/// Request to update a concept.
///
/// `broader_concept_id` uses a nested Option: the outer layer distinguishes
/// "leave unchanged" from "set", the inner one allows clearing the pointer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateConceptRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pref_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pref_label_lang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition_lang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notation: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub broader_concept_id: Option<Option<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_concept: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub same_as_external: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
}

/// A typed directed relation edge between two concepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptRelationEdge {
    pub subject_id: Uuid,
    pub object_id: Uuid,
    pub relation: ConceptRelation,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// LABEL
// =============================================================================

/// SKOS lexical label - a natural-language expression referring to
/// concepts, owned by a scheme.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub id: Uuid,
    pub scheme_id: Uuid,
    pub name: String,
    pub label_type: LabelType,

    /// ISO 639-3 code of the label's language.
    pub iso_code: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Uuid>,
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} @{} ({})", self.name, self.iso_code, self.label_type)
    }
}

/// Request to create a label. A missing label type defaults to `altLabel`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLabelRequest {
    pub scheme_id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_type: Option<LabelType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iso_code: Option<String>,
}

/// Request to update a label.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLabelRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_type: Option<LabelType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iso_code: Option<String>,
}

// =============================================================================
// HELPERS
// =============================================================================

/// Split a semicolon-delimited multi-value field into trimmed entries.
/// Empty segments are dropped; no escaping is interpreted.
pub fn split_semicolon_list(value: &str) -> Vec<&str> {
    value
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Derive a notation slug from a preferred label: lowercase, spaces to
/// hyphens, everything but alphanumerics and hyphens stripped.
pub fn slugify(label: &str) -> String {
    label
        .to_lowercase()
        .replace(char::is_whitespace, "-")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_split_semicolon_list_basic() {
        assert_eq!(
            split_semicolon_list("Miles, A.; Bechhofer, S."),
            vec!["Miles, A.", "Bechhofer, S."]
        );
    }

    #[test]
    fn test_split_semicolon_list_drops_empty_segments() {
        assert_eq!(split_semicolon_list("en;;de; "), vec!["en", "de"]);
        assert!(split_semicolon_list("").is_empty());
    }

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Maritime Archaeology"), "maritime-archaeology");
    }

    #[test]
    fn test_slugify_strips_punctuation() {
        assert_eq!(slugify("C14 (dating)!"), "c14-dating");
    }

    #[test]
    fn test_slugify_keeps_unicode_alphanumerics() {
        assert_eq!(slugify("Früh Mittelalter"), "früh-mittelalter");
    }

    #[test]
    fn test_label_type_display_roundtrip() {
        for lt in [
            LabelType::PrefLabel,
            LabelType::AltLabel,
            LabelType::HiddenLabel,
        ] {
            assert_eq!(LabelType::from_str(&lt.to_string()).unwrap(), lt);
        }
    }

    #[test]
    fn test_concept_relation_from_str_accepts_compact_form() {
        assert_eq!(
            ConceptRelation::from_str("exactmatch").unwrap(),
            ConceptRelation::ExactMatch
        );
        assert_eq!(
            ConceptRelation::from_str("broad_match").unwrap(),
            ConceptRelation::BroadMatch
        );
    }

    #[test]
    fn test_label_display_format() {
        let label = Label {
            id: uuid::Uuid::nil(),
            scheme_id: uuid::Uuid::nil(),
            name: "Burgstall".to_string(),
            label_type: LabelType::AltLabel,
            iso_code: "deu".to_string(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
            created_by: None,
        };
        assert_eq!(label.to_string(), "Burgstall @deu (altLabel)");
    }

    #[test]
    fn test_update_concept_keeps_null_apart_from_absent() {
        let cleared: UpdateConceptRequest =
            serde_json::from_str(r#"{"broader_concept_id": null}"#).unwrap();
        assert_eq!(cleared.broader_concept_id, Some(None));

        let untouched: UpdateConceptRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(untouched.broader_concept_id, None);

        let id = uuid::Uuid::new_v4();
        let repointed: UpdateConceptRequest =
            serde_json::from_str(&format!(r#"{{"broader_concept_id": "{}"}}"#, id)).unwrap();
        assert_eq!(repointed.broader_concept_id, Some(Some(id)));
    }

    #[test]
    fn test_scheme_semicolon_helpers() {
        let mut scheme = sample_scheme();
        scheme.language = "en;de".to_string();
        scheme.subject = "archaeology".to_string();
        assert_eq!(scheme.language_list(), vec!["en", "de"]);
        assert_eq!(scheme.subject_list(), vec!["archaeology"]);
        assert!(scheme.coverage_list().is_empty());
    }

    fn sample_scheme() -> ConceptScheme {
        ConceptScheme {
            id: uuid::Uuid::nil(),
            title: "Test".to_string(),
            title_lang: "en".to_string(),
            namespace: String::new(),
            creator: String::new(),
            contributor: String::new(),
            description: String::new(),
            description_lang: "en".to_string(),
            language: String::new(),
            subject: String::new(),
            coverage: String::new(),
            version: String::new(),
            publisher: String::new(),
            source: String::new(),
            rights: String::new(),
            owner: String::new(),
            relation_url: String::new(),
            legacy_id: String::new(),
            date_issued: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
            created_by: None,
        }
    }
}
