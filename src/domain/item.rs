//! Item Entity
//!
//! A captured link together with the collection that currently owns it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique item identifier, stable across collection moves.
pub type ItemId = String;

/// Named collection an item can belong to.
///
/// The built-in set mirrors the server's fixed collections; anything else
/// round-trips through `Custom` verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CollectionName {
    New,
    Keep,
    Bookmark,
    Trash,
    Gallery,
    Custom(String),
}

impl CollectionName {
    pub fn as_str(&self) -> &str {
        match self {
            CollectionName::New => "new",
            CollectionName::Keep => "keep",
            CollectionName::Bookmark => "bookmark",
            CollectionName::Trash => "trash",
            CollectionName::Gallery => "gallery",
            CollectionName::Custom(name) => name,
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "new" => CollectionName::New,
            "keep" => CollectionName::Keep,
            "bookmark" => CollectionName::Bookmark,
            "trash" => CollectionName::Trash,
            "gallery" => CollectionName::Gallery,
            other => CollectionName::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for CollectionName {
    fn from(s: String) -> Self {
        CollectionName::from_str(&s)
    }
}

impl From<CollectionName> for String {
    fn from(c: CollectionName) -> Self {
        c.as_str().to_string()
    }
}

/// A captured link ("read-it-later" entry)
///
/// `collection` denotes current ownership and changes exactly on a
/// successful transition; `domain` and `text_content` are mutable metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Globally unique identifier
    pub id: ItemId,
    /// Target URL
    pub url: String,
    /// Host the URL was captured from
    pub domain: String,
    /// Title or extracted text; may be empty
    pub text_content: String,
    /// Collection that currently owns this item
    pub collection: CollectionName,
    /// Capture time
    pub created_at: DateTime<Utc>,
}

impl Item {
    pub fn new(
        id: impl Into<ItemId>,
        url: impl Into<String>,
        domain: impl Into<String>,
        collection: CollectionName,
    ) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            domain: domain.into(),
            text_content: String::new(),
            collection,
            created_at: Utc::now(),
        }
    }

    /// Card title: text content when present, otherwise the domain.
    pub fn display_title(&self) -> &str {
        if self.text_content.is_empty() {
            &self.domain
        } else {
            &self.text_content
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_name_round_trip() {
        assert_eq!(CollectionName::Keep.as_str(), "keep");
        assert_eq!(CollectionName::from_str("trash"), CollectionName::Trash);
        assert_eq!(
            CollectionName::from_str("comics"),
            CollectionName::Custom("comics".to_string())
        );
    }

    #[test]
    fn test_collection_name_serde() {
        let json = serde_json::to_string(&CollectionName::Gallery).unwrap();
        assert_eq!(json, "\"gallery\"");

        let back: CollectionName = serde_json::from_str("\"comics\"").unwrap();
        assert_eq!(back, CollectionName::Custom("comics".to_string()));
    }

    #[test]
    fn test_item_serde_round_trip() {
        let item = Item::new("abc123", "https://example.com/post/1", "example.com", CollectionName::New);
        let json = serde_json::to_string(&item).unwrap();
        let back: Item = serde_json::from_str(&json).unwrap();
        assert_eq!(item, back);
    }

    #[test]
    fn test_display_title_falls_back_to_domain() {
        let mut item = Item::new("a", "https://example.com", "example.com", CollectionName::New);
        assert_eq!(item.display_title(), "example.com");

        item.text_content = "A Post".to_string();
        assert_eq!(item.display_title(), "A Post");
    }
}
