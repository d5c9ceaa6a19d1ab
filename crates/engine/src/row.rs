//! Metadata entity rows as the save endpoint consumes them.

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A single typed attribute value, `{type, value}` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    #[serde(rename = "type")]
    pub value_type: String,
    pub value: serde_json::Value,
}

impl FieldValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            value_type: "string".into(),
            value: serde_json::Value::String(value.into()),
        }
    }

    /// Display form for grid cells: bare text for strings, compact JSON
    /// for everything else.
    pub fn display(&self) -> String {
        match &self.value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// One metadata entity row.
///
/// Matches the save endpoint's payload shape. The fill planner treats
/// rows as plain key -> value maps and clones them for payloads; it
/// never owns their lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRow {
    pub class_id: u64,
    pub class_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<u64>,
    pub entity_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub data: FxHashMap<String, FieldValue>,
}

impl EntityRow {
    pub fn new(
        class_id: u64,
        class_name: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        Self {
            class_id,
            class_name: class_name.into(),
            parent_id: None,
            entity_id: entity_id.into(),
            external_id: None,
            created_date: None,
            data: FxHashMap::default(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: FieldValue) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Display identifier: external id when present, internal otherwise.
    pub fn display_id(&self) -> &str {
        self.external_id.as_deref().unwrap_or(&self.entity_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_serializes_camel_case() {
        let mut data = FxHashMap::default();
        data.insert("tissue".to_string(), FieldValue::string("liver"));
        let row = EntityRow {
            class_id: 7,
            class_name: "sample".into(),
            parent_id: Some(42),
            entity_id: "s-1".into(),
            external_id: Some("SAMPLE-001".into()),
            created_date: None,
            data,
        };

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["classId"], 7);
        assert_eq!(json["className"], "sample");
        assert_eq!(json["parentId"], 42);
        assert_eq!(json["entityId"], "s-1");
        assert_eq!(json["externalId"], "SAMPLE-001");
        assert_eq!(json["data"]["tissue"]["type"], "string");
        assert_eq!(json["data"]["tissue"]["value"], "liver");
        // absent createdDate is omitted, not null
        assert!(json.get("createdDate").is_none());
    }

    #[test]
    fn row_round_trips() {
        let json = r#"{
            "classId": 3,
            "className": "sample",
            "entityId": "s-9",
            "createdDate": "2024-06-01T12:00:00Z",
            "data": { "batch": { "type": "string", "value": "b7" } }
        }"#;
        let row: EntityRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.display_id(), "s-9");
        assert_eq!(row.data["batch"].display(), "b7");
        assert!(row.created_date.is_some());

        let back: EntityRow =
            serde_json::from_str(&serde_json::to_string(&row).unwrap()).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn non_string_values_display_as_json() {
        let v = FieldValue {
            value_type: "long".into(),
            value: serde_json::json!(17),
        };
        assert_eq!(v.display(), "17");
    }
}
