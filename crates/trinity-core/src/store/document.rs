//! Documents and write payloads.

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A document as observed from the store.
///
/// `id` is the last path segment and is assigned by the store on create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Decodes the document into a typed entity, exposing the id as an `id` field.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        let mut fields = self.fields.clone();
        fields.insert("id".to_string(), Value::String(self.id.clone()));
        Ok(serde_json::from_value(Value::Object(fields))?)
    }
}

/// Field values for a create, set or update.
///
/// Fields named with [`Write::server_timestamp`] are filled in by the store
/// with its own clock (epoch milliseconds), never by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Write {
    fields: Map<String, Value>,
    server_timestamps: Vec<String>,
}

impl Write {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a plain field value.
    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.server_timestamps.retain(|name| name != field);
        self.fields.insert(field.to_string(), value.into());
        self
    }

    /// Marks a field to receive the store's timestamp.
    pub fn server_timestamp(mut self, field: &str) -> Self {
        self.fields.remove(field);
        if !self.server_timestamps.iter().any(|name| name == field) {
            self.server_timestamps.push(field.to_string());
        }
        self
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn server_timestamp_fields(&self) -> &[String] {
        &self.server_timestamps
    }

    /// Names of every field this write touches.
    pub fn field_paths(&self) -> Vec<String> {
        self.fields
            .keys()
            .cloned()
            .chain(self.server_timestamps.iter().cloned())
            .collect()
    }

    /// Produces the concrete field map using `now` for server timestamps.
    pub fn resolve(self, now: i64) -> Map<String, Value> {
        let mut fields = self.fields;
        for name in self.server_timestamps {
            fields.insert(name, Value::from(now));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Note {
        id: String,
        text: String,
        created_at: i64,
    }

    #[test]
    fn test_decode_injects_id() {
        let fields = Write::new().set("text", "hello").set("createdAt", 7).resolve(0);
        let doc = Document::new("abc", fields);

        let note: Note = doc.decode().unwrap();
        assert_eq!(note.id, "abc");
        assert_eq!(note.text, "hello");
        assert_eq!(note.created_at, 7);
    }

    #[test]
    fn test_server_timestamp_overrides_plain_value() {
        let write = Write::new().set("updatedAt", 1).server_timestamp("updatedAt");
        assert!(write.fields().is_empty());
        assert_eq!(write.field_paths(), vec!["updatedAt".to_string()]);

        let resolved = write.resolve(42);
        assert_eq!(resolved.get("updatedAt"), Some(&Value::from(42)));
    }
}
