//! Documents and the record-to-document conversion used at ingestion

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the record field holding the indexed text.
pub const CONTENT_FIELD: &str = "content";

/// String metadata attached to a document, in the order fields were inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Metadata {
    fields: Vec<(String, String)>,
}

impl Metadata {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Set `key`, replacing the value in place if the key is already present.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A unit of indexing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
    pub metadata: Metadata,
}

/// Limits applied when turning raw records into documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestLimits {
    /// Records with fewer content characters than this are rejected.
    pub min_content_chars: usize,
    /// Metadata values are cut to this many characters.
    pub max_metadata_chars: usize,
}

impl Default for IngestLimits {
    fn default() -> Self {
        Self {
            min_content_chars: 20,
            max_metadata_chars: 500,
        }
    }
}

/// Why a record was not turned into a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NotAnObject,
    MissingContent,
    ContentTooShort { chars: usize },
}

impl Document {
    /// Build a document from a raw record.
    ///
    /// The record must be a JSON object with a string `content` field of at
    /// least `min_content_chars` characters. Every other non-empty field is
    /// copied into metadata, stringified and cut to `max_metadata_chars`.
    pub fn from_record(
        id: String,
        record: &Value,
        limits: &IngestLimits,
    ) -> std::result::Result<Self, Rejection> {
        let fields = record.as_object().ok_or(Rejection::NotAnObject)?;
        let content = fields
            .get(CONTENT_FIELD)
            .and_then(Value::as_str)
            .filter(|c| !c.is_empty())
            .ok_or(Rejection::MissingContent)?;

        let chars = content.chars().count();
        if chars < limits.min_content_chars {
            return Err(Rejection::ContentTooShort { chars });
        }

        let mut metadata = Metadata::new();
        for (key, value) in fields {
            if key == CONTENT_FIELD || is_empty_value(value) {
                continue;
            }
            metadata.insert(key.as_str(), truncate_chars(&stringify(value), limits.max_metadata_chars));
        }

        Ok(Self {
            id,
            content: content.to_string(),
            metadata,
        })
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => s[..end].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn convert(record: Value) -> std::result::Result<Document, Rejection> {
        Document::from_record("doc_0".to_string(), &record, &IngestLimits::default())
    }

    #[test]
    fn test_from_record_copies_metadata() {
        let doc = convert(json!({
            "content": "Thủ tục đăng ký khai sinh cho trẻ em",
            "title": "Khai sinh",
            "url": "https://example.gov.vn/khai-sinh",
            "views": 12,
        }))
        .unwrap();

        assert_eq!(doc.id, "doc_0");
        assert_eq!(doc.metadata.get("title"), Some("Khai sinh"));
        assert_eq!(doc.metadata.get("views"), Some("12"));
        assert_eq!(doc.metadata.get("content"), None);
        assert_eq!(doc.metadata.len(), 3);
    }

    #[test]
    fn test_metadata_keeps_record_field_order() {
        let doc = convert(json!({
            "url": "https://example.gov.vn/ket-hon",
            "content": "Thủ tục đăng ký kết hôn tại xã",
            "title": "Kết hôn",
            "source": "dichvucong",
        }))
        .unwrap();

        let keys: Vec<&str> = doc.metadata.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["url", "title", "source"]);
    }

    #[test]
    fn test_insert_replaces_existing_key() {
        let mut metadata = Metadata::new();
        metadata.insert("title", "Cũ");
        metadata.insert("source", "main_site");
        metadata.insert("title", "Mới");
        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata.get("title"), Some("Mới"));
        assert_eq!(metadata.iter().next(), Some(("title", "Mới")));
    }

    #[test]
    fn test_empty_fields_are_skipped() {
        let doc = convert(json!({
            "content": "Nội dung đủ dài để được lập chỉ mục",
            "title": "",
            "page_name": null,
            "count": 0,
            "tags": [],
            "published": false,
            "source": "main_site",
        }))
        .unwrap();

        let keys: Vec<&str> = doc.metadata.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["source"]);
    }

    #[test]
    fn test_metadata_values_truncated_by_chars() {
        let long = "ệ".repeat(600);
        let doc = convert(json!({
            "content": "Nội dung đủ dài để được lập chỉ mục",
            "title": long,
        }))
        .unwrap();
        assert_eq!(doc.metadata.get("title").unwrap().chars().count(), 500);
    }

    #[test]
    fn test_rejections() {
        assert_eq!(convert(json!("plain string")), Err(Rejection::NotAnObject));
        assert_eq!(convert(json!({"title": "x"})), Err(Rejection::MissingContent));
        assert_eq!(convert(json!({"content": 42})), Err(Rejection::MissingContent));
        assert_eq!(
            convert(json!({"content": "quá ngắn"})),
            Err(Rejection::ContentTooShort { chars: 8 })
        );
    }

    #[test]
    fn test_content_length_boundary() {
        assert!(convert(json!({"content": "a".repeat(20)})).is_ok());
        assert!(convert(json!({"content": "a".repeat(19)})).is_err());
    }
}
