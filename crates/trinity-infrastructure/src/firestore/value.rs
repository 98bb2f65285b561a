//! Typed-value encoding used by the REST API.
//!
//! Every value on the wire is a single-key object naming its type
//! (`{"stringValue": "x"}`, `{"integerValue": "3"}` ...). Timestamps are
//! decoded to epoch milliseconds so documents look the same as those of the
//! in-memory store.

use chrono::DateTime;
use serde_json::{Map, Value, json};
use trinity_core::error::{Result, TrinityError};
use trinity_core::store::Document;

pub(crate) fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64().unwrap_or_default() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
    }
}

pub(crate) fn encode_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(name, value)| (name.clone(), encode_value(value)))
        .collect()
}

pub(crate) fn decode_value(value: &Value) -> Result<Value> {
    let Some((kind, inner)) = value.as_object().and_then(|obj| obj.iter().next()) else {
        return Err(malformed(value));
    };

    Ok(match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" => inner.as_bool().map(Value::Bool).ok_or_else(|| malformed(value))?,
        "integerValue" => {
            let parsed = match inner {
                Value::String(s) => s.parse::<i64>().ok(),
                other => other.as_i64(),
            };
            parsed.map(Value::from).ok_or_else(|| malformed(value))?
        }
        "doubleValue" => inner.as_f64().map(Value::from).ok_or_else(|| malformed(value))?,
        "timestampValue" => {
            let text = inner.as_str().ok_or_else(|| malformed(value))?;
            let parsed = DateTime::parse_from_rfc3339(text).map_err(|_| malformed(value))?;
            Value::from(parsed.timestamp_millis())
        }
        "stringValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "arrayValue" => {
            let items = inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode_value).collect::<Result<Vec<_>>>())
                .transpose()?
                .unwrap_or_default();
            Value::Array(items)
        }
        "mapValue" => {
            let fields = inner
                .get("fields")
                .and_then(Value::as_object)
                .map(decode_fields)
                .transpose()?
                .unwrap_or_default();
            Value::Object(fields)
        }
        _ => inner.clone(),
    })
}

pub(crate) fn decode_fields(fields: &Map<String, Value>) -> Result<Map<String, Value>> {
    fields
        .iter()
        .map(|(name, value)| Ok((name.clone(), decode_value(value)?)))
        .collect()
}

/// Decodes a REST document resource (`{"name": ".../docId", "fields": {...}}`).
pub(crate) fn decode_document(resource: &Value) -> Result<Document> {
    let name = resource
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(resource))?;
    let id = name.rsplit('/').next().unwrap_or(name);
    let fields = match resource.get("fields").and_then(Value::as_object) {
        Some(fields) => decode_fields(fields)?,
        None => Map::new(),
    };
    Ok(Document::new(id, fields))
}

fn malformed(value: &Value) -> TrinityError {
    TrinityError::Serialization {
        format: "Firestore".to_string(),
        message: format!("unexpected value: {value}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers_travel_as_strings() {
        assert_eq!(encode_value(&json!(42)), json!({ "integerValue": "42" }));
        assert_eq!(decode_value(&json!({ "integerValue": "42" })).unwrap(), json!(42));
    }

    #[test]
    fn test_timestamp_decodes_to_millis() {
        let decoded = decode_value(&json!({ "timestampValue": "2024-01-02T03:04:05.678Z" })).unwrap();
        assert_eq!(decoded, json!(1_704_164_645_678i64));
    }

    #[test]
    fn test_empty_array_decodes() {
        assert_eq!(decode_value(&json!({ "arrayValue": {} })).unwrap(), json!([]));
        assert_eq!(
            encode_value(&json!(["life-01"])),
            json!({ "arrayValue": { "values": [{ "stringValue": "life-01" }] } })
        );
    }

    #[test]
    fn test_decode_document_takes_last_segment_as_id() {
        let resource = json!({
            "name": "projects/p/databases/(default)/documents/users/u/journal/abc",
            "fields": { "text": { "stringValue": "hi" } }
        });
        let doc = decode_document(&resource).unwrap();
        assert_eq!(doc.id, "abc");
        assert_eq!(doc.get("text"), Some(&json!("hi")));
    }
}
