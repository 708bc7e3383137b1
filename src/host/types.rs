//! Value shapes exchanged with the host table platform.
//!
//! Cell values cross the host boundary as raw JSON (the host is dynamically
//! typed). The helpers here convert between that JSON and the two shapes the
//! workflow cares about: rich text segment sequences and attachment lists.

use serde::{Deserialize, Serialize};

// ─── Selection ───────────────────────────────────────────────────────────────

/// The host's current table/record selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    #[serde(default)]
    pub table_id: Option<String>,
    #[serde(default)]
    pub record_id: Option<String>,
}

impl Selection {
    /// A selection pointing at one record.
    pub fn record(table_id: impl Into<String>, record_id: impl Into<String>) -> Self {
        Self {
            table_id: Some(table_id.into()),
            record_id: Some(record_id.into()),
        }
    }

    /// Both ids, when both are present and non-empty.
    pub fn ids(&self) -> Option<(&str, &str)> {
        let table = self.table_id.as_deref().filter(|s| !s.is_empty())?;
        let record = self.record_id.as_deref().filter(|s| !s.is_empty())?;
        Some((table, record))
    }
}

// ─── Schema ──────────────────────────────────────────────────────────────────

/// Table metadata returned by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Field metadata returned by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMeta {
    pub id: String,
    pub name: String,
}

// ─── Rich Text ───────────────────────────────────────────────────────────────

/// One segment of a rich text cell value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(rename = "type", default = "default_segment_type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
}

fn default_segment_type() -> String {
    "text".to_string()
}

impl Segment {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: default_segment_type(),
            text: text.into(),
        }
    }
}

/// Concatenate the text of every segment in a rich text cell value.
///
/// Absent values, non-array values and empty arrays all read as `""`.
/// Segments without a `text` property contribute nothing.
pub fn rich_text_to_string(value: Option<&serde_json::Value>) -> String {
    let Some(serde_json::Value::Array(segments)) = value else {
        return String::new();
    };
    segments
        .iter()
        .filter_map(|seg| seg.get("text").and_then(|t| t.as_str()))
        .collect()
}

/// Wrap plain text in the single-segment shape text fields require.
pub fn string_to_rich_text(text: &str) -> serde_json::Value {
    serde_json::json!([Segment::text(text)])
}

// ─── Attachments ─────────────────────────────────────────────────────────────

/// One attachment in an attachment cell value.
///
/// Only `token` is interpreted; everything else the host sends is kept as
/// opaque metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub token: String,
    #[serde(flatten)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// The first attachment of an attachment cell value.
///
/// Only element 0 is parsed, so later elements with missing or odd fields
/// never affect the result. `None` when the value is absent, not an array,
/// empty, or its first element has no string `token`.
pub fn first_attachment(value: Option<&serde_json::Value>) -> Option<Attachment> {
    let first = value?.as_array()?.first()?;
    serde_json::from_value(first.clone()).ok()
}
