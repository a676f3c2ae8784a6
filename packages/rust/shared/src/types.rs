//! Core domain types: indexables and their object types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// ---------------------------------------------------------------------------
// ObjectType
// ---------------------------------------------------------------------------

/// The kind of content object an indexable caches metadata for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectType {
    Post,
    Term,
    User,
    HomePage,
    ErrorPage,
    SearchResult,
    DateArchive,
    PostTypeArchive,
    SystemPage,
}

impl ObjectType {
    /// Stable string form, as stored and serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Term => "term",
            Self::User => "user",
            Self::HomePage => "home-page",
            Self::ErrorPage => "error-page",
            Self::SearchResult => "search-result",
            Self::DateArchive => "date-archive",
            Self::PostTypeArchive => "post-type-archive",
            Self::SystemPage => "system-page",
        }
    }

    /// Whether objects of this type can be ancestors of other indexables,
    /// i.e. whether a permalink change can make descendant caches stale.
    pub fn has_descendants(self) -> bool {
        matches!(self, Self::Post | Self::Term)
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ObjectType {
    type Err = crate::SeoGraphError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "post" => Self::Post,
            "term" => Self::Term,
            "user" => Self::User,
            "home-page" => Self::HomePage,
            "error-page" => Self::ErrorPage,
            "search-result" => Self::SearchResult,
            "date-archive" => Self::DateArchive,
            "post-type-archive" => Self::PostTypeArchive,
            "system-page" => Self::SystemPage,
            other => {
                return Err(crate::SeoGraphError::parse(format!(
                    "unknown object type: {other}"
                )));
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Indexable
// ---------------------------------------------------------------------------

/// Cached, denormalized metadata for one content object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indexable {
    /// Storage row id; `None` until the record is first saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Id of the underlying content object (absent for singleton pages).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<i64>,
    pub object_type: ObjectType,
    /// Post type or taxonomy name, e.g. `post`, `page`, `category`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_sub_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permalink: Option<String>,
    /// Derived from `permalink`; see [`permalink_hash`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permalink_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breadcrumb_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_description: Option<String>,
    #[serde(default)]
    pub has_ancestors: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Indexable {
    /// A fresh, unsaved indexable with every cached field empty.
    pub fn new(object_type: ObjectType) -> Self {
        Self {
            id: None,
            object_id: None,
            object_type,
            object_sub_type: None,
            permalink: None,
            permalink_hash: None,
            title: None,
            description: None,
            breadcrumb_title: None,
            og_description: None,
            has_ancestors: false,
            updated_at: None,
        }
    }

    /// Convenience constructor for a post-like object.
    pub fn for_object(object_type: ObjectType, object_id: i64, sub_type: &str) -> Self {
        Self {
            object_id: Some(object_id),
            object_sub_type: Some(sub_type.to_string()),
            ..Self::new(object_type)
        }
    }

    /// Set the permalink and keep `permalink_hash` in sync with it.
    pub fn set_permalink(&mut self, permalink: Option<String>) {
        self.permalink_hash = permalink.as_deref().map(permalink_hash);
        self.permalink = permalink;
    }

    /// Drop the ancestor-derived permalink cache so it is rebuilt on next access.
    pub fn clear_permalink(&mut self) {
        self.set_permalink(None);
    }

    /// Whether the sub type matches `sub_type`.
    pub fn is_sub_type(&self, sub_type: &str) -> bool {
        self.object_sub_type.as_deref() == Some(sub_type)
    }
}

/// Lookup digest for a permalink: `<byte length>:<sha256 hex>`.
pub fn permalink_hash(permalink: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(permalink.as_bytes());
    format!("{}:{:x}", permalink.len(), hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_type_roundtrip() {
        for ty in [
            ObjectType::Post,
            ObjectType::HomePage,
            ObjectType::ErrorPage,
            ObjectType::PostTypeArchive,
        ] {
            let parsed: ObjectType = ty.as_str().parse().expect("parse object type");
            assert_eq!(parsed, ty);
        }
        assert!("attachment-page".parse::<ObjectType>().is_err());
    }

    #[test]
    fn object_type_serializes_kebab_case() {
        let json = serde_json::to_string(&ObjectType::HomePage).expect("serialize");
        assert_eq!(json, "\"home-page\"");
    }

    #[test]
    fn only_posts_and_terms_have_descendants() {
        assert!(ObjectType::Post.has_descendants());
        assert!(ObjectType::Term.has_descendants());
        assert!(!ObjectType::User.has_descendants());
        assert!(!ObjectType::HomePage.has_descendants());
    }

    #[test]
    fn set_permalink_keeps_hash_in_sync() {
        let mut indexable = Indexable::for_object(ObjectType::Post, 7, "page");
        indexable.set_permalink(Some("https://example.org/about".into()));

        let hash = indexable.permalink_hash.clone().expect("hash set");
        assert!(hash.starts_with("25:"));
        assert_eq!(hash, permalink_hash("https://example.org/about"));

        indexable.clear_permalink();
        assert!(indexable.permalink.is_none());
        assert!(indexable.permalink_hash.is_none());
    }

    #[test]
    fn indexable_deserializes_with_defaults() {
        let json = r#"{"object_type": "term", "object_id": 3, "permalink": "https://example.org/cat"}"#;
        let parsed: Indexable = serde_json::from_str(json).expect("deserialize");
        assert_eq!(parsed.object_type, ObjectType::Term);
        assert_eq!(parsed.object_id, Some(3));
        assert!(parsed.id.is_none());
        assert!(!parsed.has_ancestors);
    }
}
