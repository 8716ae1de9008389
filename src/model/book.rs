//! The book entity as returned by the catalog service.

use crate::pagination::Keyed;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Status marker a server embeds in an otherwise successful payload to say
/// the resource is intentionally absent.
pub const NOT_FOUND_SENTINEL: u64 = 404;

/// A single catalog entity.
///
/// Only `id` is interpreted by the retrieval layer. The named fields are
/// read by the filter/sort projection; everything else the server sends is
/// kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookResource {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub series: Option<Series>,
    #[serde(default, alias = "cover")]
    pub cover_url: Option<String>,
    /// Catalog rating.
    #[serde(default)]
    pub rating: Option<f32>,
    /// Per-user overlay, only present on authenticated responses.
    #[serde(default)]
    pub user_book: Option<UserBook>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

/// Reading state the current user attached to a book.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBook {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub progress: Option<u32>,
    #[serde(default)]
    pub rating: Option<f32>,
}

impl BookResource {
    /// Minimal constructor, mostly for tests and fixtures.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: None,
            series: None,
            cover_url: None,
            rating: None,
            user_book: None,
            extra: Map::new(),
        }
    }

    pub fn with_author(mut self, name: impl Into<String>) -> Self {
        self.author = Some(Author {
            id: None,
            name: name.into(),
        });
        self
    }

    pub fn with_series(mut self, name: impl Into<String>) -> Self {
        self.series = Some(Series {
            id: None,
            name: name.into(),
        });
        self
    }

    pub fn with_rating(mut self, rating: f32) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.user_book.get_or_insert_with(UserBook::default).status = Some(status.into());
        self
    }

    pub fn author_name(&self) -> Option<&str> {
        self.author.as_ref().map(|a| a.name.as_str())
    }

    pub fn series_name(&self) -> Option<&str> {
        self.series.as_ref().map(|s| s.name.as_str())
    }

    /// The user's reading status, if any.
    pub fn reading_status(&self) -> Option<&str> {
        self.user_book.as_ref()?.status.as_deref()
    }

    /// The user's own rating when set, the catalog rating otherwise.
    pub fn effective_rating(&self) -> Option<f32> {
        self.user_book
            .as_ref()
            .and_then(|ub| ub.rating)
            .or(self.rating)
    }
}

impl Keyed for BookResource {
    fn key(&self) -> Option<&str> {
        if self.id.is_empty() {
            None
        } else {
            Some(&self.id)
        }
    }
}

/// True when a decoded payload carries the "not found" status marker.
///
/// Accepts the marker as a number or a numeric string.
pub fn is_not_found_sentinel(payload: &Value) -> bool {
    match payload.get("status") {
        Some(Value::Number(n)) => n.as_u64() == Some(NOT_FOUND_SENTINEL),
        Some(Value::String(s)) => s.trim() == "404",
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_keeps_unknown_fields() {
        let book: BookResource = serde_json::from_value(json!({
            "id": "b1",
            "title": "Dune",
            "author": { "name": "Frank Herbert" },
            "cover": "https://img/dune.jpg",
            "rating": 4,
            "userBook": { "status": "READING", "progress": 120 },
            "pageCount": 412
        }))
        .unwrap();

        assert_eq!(book.author_name(), Some("Frank Herbert"));
        assert_eq!(book.cover_url.as_deref(), Some("https://img/dune.jpg"));
        assert_eq!(book.reading_status(), Some("READING"));
        assert_eq!(book.effective_rating(), Some(4.0));
        assert_eq!(book.extra.get("pageCount"), Some(&json!(412)));
    }

    #[test]
    fn test_user_rating_wins_over_catalog_rating() {
        let mut book = BookResource::new("b1", "Dune").with_rating(3.0);
        book.user_book = Some(UserBook {
            rating: Some(5.0),
            ..UserBook::default()
        });
        assert_eq!(book.effective_rating(), Some(5.0));
    }

    #[test]
    fn test_sentinel_detection() {
        assert!(is_not_found_sentinel(&json!({ "status": 404 })));
        assert!(is_not_found_sentinel(&json!({ "status": "404" })));
        assert!(!is_not_found_sentinel(&json!({ "status": 200, "id": "x" })));
        assert!(!is_not_found_sentinel(&json!({ "id": "x" })));
    }

    #[test]
    fn test_empty_id_is_unkeyed() {
        assert_eq!(BookResource::new("", "Untitled").key(), None);
        assert_eq!(BookResource::new("b1", "Dune").key(), Some("b1"));
    }
}
