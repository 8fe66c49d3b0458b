//! Data models for the news payload.
//!
//! - [`Article`]: one news item; every display field is optional
//! - [`ArticleKey`]: stable identity used to address rendered cards
//! - [`PageResponse`]: one page of articles plus the total page count
//!
//! The backend is an external collaborator and its payload is not trusted to
//! be well formed. Decoding goes through [`serde_json::Value`] so that a bad
//! field degrades to "absent" instead of rejecting the whole page.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt;

/// A single news article as returned by the backend.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Article {
    /// Server-provided identifier, when the backend sends one.
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Publication time in local wall-clock time.
    pub published_date: Option<NaiveDateTime>,
    pub media_url: Option<String>,
    /// External link opened when the card is activated.
    pub link: Option<String>,
}

impl Article {
    /// Decode an article from one element of the `content` array.
    ///
    /// Returns `None` when the element is not a JSON object. Fields that are
    /// missing, `null`, empty, or of the wrong type decode as `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            id: id_field(obj),
            title: text_field(obj, "title"),
            description: text_field(obj, "description"),
            published_date: obj.get("publishedDate").and_then(parse_timestamp),
            media_url: text_field(obj, "mediaUrl"),
            link: text_field(obj, "link"),
        })
    }

    /// The stable key for this article.
    ///
    /// Uses the server id when present, otherwise a SHA-256 hash over the
    /// display fields so that identical content always maps to the same key.
    pub fn key(&self) -> ArticleKey {
        if let Some(id) = &self.id {
            return ArticleKey::Id(id.clone());
        }

        let mut hasher = Sha256::new();
        let date = self.published_date.map(|d| d.to_string());
        for field in [
            self.title.as_deref(),
            self.description.as_deref(),
            date.as_deref(),
            self.media_url.as_deref(),
            self.link.as_deref(),
        ] {
            match field {
                Some(text) => {
                    hasher.update([1u8]);
                    hasher.update((text.len() as u64).to_le_bytes());
                    hasher.update(text.as_bytes());
                }
                None => hasher.update([0u8]),
            }
        }
        ArticleKey::Content(hex::encode(hasher.finalize()))
    }
}

/// Identity of an article across re-renders.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArticleKey {
    /// Identifier assigned by the backend.
    Id(String),
    /// Hex SHA-256 of the article's display fields.
    Content(String),
}

impl fmt::Display for ArticleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArticleKey::Id(id) => write!(f, "id:{id}"),
            ArticleKey::Content(hash) => write!(f, "sha256:{}", &hash[..hash.len().min(12)]),
        }
    }
}

/// One page of the news listing.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResponse {
    pub content: Vec<Article>,
    /// Always at least 1.
    pub total_pages: u32,
}

impl Default for PageResponse {
    fn default() -> Self {
        Self {
            content: Vec::new(),
            total_pages: 1,
        }
    }
}

impl PageResponse {
    /// Build a page from an already-parsed JSON document.
    ///
    /// A missing or non-array `content` yields no articles and a missing,
    /// fractional or zero `totalPages` yields 1. Whole-number floats such as
    /// `3.0` count as integers.
    pub fn from_value(value: &Value) -> Self {
        let content = value
            .get("content")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Article::from_value).collect())
            .unwrap_or_default();

        let total_pages = value
            .get("totalPages")
            .and_then(page_count)
            .filter(|&n| n >= 1)
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
            .unwrap_or(1);

        Self {
            content,
            total_pages,
        }
    }

    /// Parse a raw response body. Fails only when the body is not JSON.
    pub fn from_slice(body: &[u8]) -> crate::error::Result<Self> {
        let value: Value = serde_json::from_slice(body)?;
        Ok(Self::from_value(&value))
    }
}

fn page_count(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= 1.0)
            .map(|f| f.min(u64::MAX as f64) as u64)
    })
}

fn text_field(obj: &Map<String, Value>, name: &str) -> Option<String> {
    obj.get(name)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn id_field(obj: &Map<String, Value>) -> Option<String> {
    match obj.get("id")? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Accepts RFC 3339, naive ISO date-times, plain dates, and epoch millis.
fn parse_timestamp(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Number(n) => {
            let millis = n.as_i64()?;
            DateTime::<Utc>::from_timestamp_millis(millis).map(|dt| dt.with_timezone(&Local).naive_local())
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Local).naive_local());
            }
            if let Ok(dt) = s.parse::<NaiveDateTime>() {
                return Some(dt);
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
                return Some(dt);
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_article_from_full_object() {
        let value = json!({
            "id": 42,
            "title": "Headline",
            "description": "Body",
            "publishedDate": "2025-05-01T10:30:00",
            "mediaUrl": "https://img.example.com/a.jpg",
            "link": "https://example.com/a"
        });
        let article = Article::from_value(&value).unwrap();

        assert_eq!(article.id.as_deref(), Some("42"));
        assert_eq!(article.title.as_deref(), Some("Headline"));
        assert_eq!(article.description.as_deref(), Some("Body"));
        assert_eq!(
            article.published_date,
            NaiveDate::from_ymd_opt(2025, 5, 1).and_then(|d| d.and_hms_opt(10, 30, 0))
        );
        assert_eq!(article.media_url.as_deref(), Some("https://img.example.com/a.jpg"));
        assert_eq!(article.link.as_deref(), Some("https://example.com/a"));
    }

    #[test]
    fn test_article_tolerates_bad_fields() {
        let value = json!({
            "title": "",
            "description": null,
            "publishedDate": "yesterday-ish",
            "mediaUrl": 12,
            "link": ["nope"]
        });
        let article = Article::from_value(&value).unwrap();
        assert_eq!(article, Article::default());
    }

    #[test]
    fn test_article_rejects_non_object() {
        assert!(Article::from_value(&json!("just a string")).is_none());
        assert!(Article::from_value(&json!(null)).is_none());
    }

    #[test]
    fn test_published_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let naive_fraction = parse_timestamp(&json!("2025-05-01T10:30:00.123")).unwrap();
        assert_eq!(naive_fraction.date(), expected);

        let plain = parse_timestamp(&json!("2025-05-01")).unwrap();
        assert_eq!(plain, expected.and_hms_opt(0, 0, 0).unwrap());

        let spaced = parse_timestamp(&json!("2025-05-01 08:00:00")).unwrap();
        assert_eq!(spaced.date(), expected);

        // Offset-bearing and epoch forms convert to local time, so only check
        // that they decode.
        assert!(parse_timestamp(&json!("2025-05-01T12:00:00Z")).is_some());
        assert!(parse_timestamp(&json!(1_746_093_600_000i64)).is_some());
        assert!(parse_timestamp(&json!(true)).is_none());
    }

    #[test]
    fn test_key_prefers_server_id() {
        let article = Article {
            id: Some("abc".to_string()),
            title: Some("T".to_string()),
            ..Default::default()
        };
        assert_eq!(article.key(), ArticleKey::Id("abc".to_string()));
        assert_eq!(article.key().to_string(), "id:abc");
    }

    #[test]
    fn test_content_key_is_stable_and_distinguishes_fields() {
        let a = Article {
            title: Some("Same".to_string()),
            ..Default::default()
        };
        let b = a.clone();
        let c = Article {
            description: Some("Same".to_string()),
            ..Default::default()
        };

        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), c.key());
        assert!(a.key().to_string().starts_with("sha256:"));
    }

    #[test]
    fn test_page_response_defaults() {
        let page = PageResponse::from_value(&json!({}));
        assert_eq!(page, PageResponse::default());

        let page = PageResponse::from_value(&json!({"content": "oops", "totalPages": 0}));
        assert!(page.content.is_empty());
        assert_eq!(page.total_pages, 1);

        let page = PageResponse::from_value(&json!({"totalPages": -4}));
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_page_response_accepts_whole_float_total() {
        let page = PageResponse::from_value(&json!({"totalPages": 3.0}));
        assert_eq!(page.total_pages, 3);

        let page = PageResponse::from_value(&json!({"totalPages": 2.5}));
        assert_eq!(page.total_pages, 1);

        let page = PageResponse::from_value(&json!({"totalPages": 0.0}));
        assert_eq!(page.total_pages, 1);

        let page = PageResponse::from_slice(br#"{"totalPages": 4.0}"#).unwrap();
        assert_eq!(page.total_pages, 4);
    }

    #[test]
    fn test_page_response_skips_non_objects() {
        let page = PageResponse::from_value(&json!({
            "content": [{"title": "A"}, 7, {"title": "B"}],
            "totalPages": 3
        }));
        assert_eq!(page.content.len(), 2);
        assert_eq!(page.content[1].title.as_deref(), Some("B"));
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_page_response_from_slice() {
        let page = PageResponse::from_slice(br#"{"content":[{"title":"A"}],"totalPages":2}"#).unwrap();
        assert_eq!(page.content.len(), 1);
        assert_eq!(page.total_pages, 2);

        assert!(PageResponse::from_slice(b"<html>502 Bad Gateway</html>").is_err());
    }
}
