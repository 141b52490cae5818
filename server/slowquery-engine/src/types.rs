//! Core types for the slow-query engine (JSON contracts + internal models).

use chrono::{DateTime, Utc};
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Raw field map (one matched line, before coercion)
// ---------------------------------------------------------------------------

/// Raw text captured from one matched log line. Borrowed from the line and
/// discarded once coercion has produced the typed record.
#[derive(Debug)]
pub struct RawFields<'a> {
  pub time: &'a str,
  pub op: &'a str,
  pub ns: &'a str,
  pub command: Option<&'a str>,
  pub command_detail: Option<&'a str>,
  pub query: Option<&'a str>,
  pub plan_summary: Option<&'a str>,
  pub ms: &'a str,
  /// Trailing metric tokens, canonical name → raw digits, in line order.
  /// Repeated names are allowed; the last occurrence wins during coercion.
  pub metrics: Vec<(&'static str, &'a str)>,
}

// ---------------------------------------------------------------------------
// Parsed query document
// ---------------------------------------------------------------------------

/// A parsed query document. Scalars keep their literal text and are never
/// typed further; only the tree structure matters for shape extraction.
///
/// Deserializes with its own visitor so object keys are observed in document
/// order, not re-sorted.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentNode {
  Object(Vec<(String, DocumentNode)>),
  Array(Vec<DocumentNode>),
  Scalar(String),
}

impl<'de> Deserialize<'de> for DocumentNode {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    struct NodeVisitor;

    impl<'de> Visitor<'de> for NodeVisitor {
      type Value = DocumentNode;

      fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a query document value")
      }

      fn visit_bool<E: de::Error>(self, v: bool) -> Result<DocumentNode, E> {
        Ok(DocumentNode::Scalar(v.to_string()))
      }

      fn visit_i64<E: de::Error>(self, v: i64) -> Result<DocumentNode, E> {
        Ok(DocumentNode::Scalar(v.to_string()))
      }

      fn visit_u64<E: de::Error>(self, v: u64) -> Result<DocumentNode, E> {
        Ok(DocumentNode::Scalar(v.to_string()))
      }

      fn visit_f64<E: de::Error>(self, v: f64) -> Result<DocumentNode, E> {
        Ok(DocumentNode::Scalar(v.to_string()))
      }

      fn visit_str<E: de::Error>(self, v: &str) -> Result<DocumentNode, E> {
        Ok(DocumentNode::Scalar(v.to_owned()))
      }

      fn visit_unit<E: de::Error>(self) -> Result<DocumentNode, E> {
        Ok(DocumentNode::Scalar("null".to_owned()))
      }

      fn visit_seq<A>(self, mut seq: A) -> Result<DocumentNode, A::Error>
      where
        A: SeqAccess<'de>,
      {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element()? {
          items.push(item);
        }
        Ok(DocumentNode::Array(items))
      }

      fn visit_map<A>(self, mut map: A) -> Result<DocumentNode, A::Error>
      where
        A: MapAccess<'de>,
      {
        let mut entries = Vec::new();
        while let Some(entry) = map.next_entry()? {
          entries.push(entry);
        }
        Ok(DocumentNode::Object(entries))
      }
    }

    deserializer.deserialize_any(NodeVisitor)
  }
}

// ---------------------------------------------------------------------------
// Output record (JSON contract — what we emit)
// ---------------------------------------------------------------------------

/// One normalized slow-query record. Built once per matched line, never
/// mutated after emission. Absent optional fields are omitted from the JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlowQueryRecord {
  pub ts: DateTime<Utc>,
  pub op: String,
  pub ns: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub command: Option<String>,
  #[serde(rename = "commandDetail", skip_serializing_if = "Option::is_none")]
  pub command_detail: Option<String>,
  #[serde(rename = "planSummary", skip_serializing_if = "Option::is_none")]
  pub plan_summary: Option<String>,
  /// Query shape fingerprint, or the raw query text when canonicalization
  /// fails.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub query: Option<String>,
  /// Operation duration in milliseconds.
  pub ms: i64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub nscanned: Option<i64>,
  #[serde(rename = "nMatched", skip_serializing_if = "Option::is_none")]
  pub n_matched: Option<i64>,
  #[serde(rename = "nModified", skip_serializing_if = "Option::is_none")]
  pub n_modified: Option<i64>,
  #[serde(rename = "numYields", skip_serializing_if = "Option::is_none")]
  pub num_yields: Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reslen: Option<i64>,
  /// Lock hold times in milliseconds (the log reports microseconds).
  #[serde(skip_serializing_if = "Option::is_none")]
  pub lockread: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub lockwrite: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub lockglobread: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub lockglobwrite: Option<f64>,
}

// ---------------------------------------------------------------------------
// Per-line outcome
// ---------------------------------------------------------------------------

/// Why a line produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
  /// The line does not match the slow-query grammar.
  NoMatch,
  /// The line matched but its timestamp fits none of the supported layouts.
  BadTimestamp,
}

/// The outcome of processing one line: a record or a typed skip. Containment
/// is structural; nothing a single line does can escape this value.
#[derive(Debug, Clone)]
pub enum Disposition {
  Record(SlowQueryRecord),
  Skipped(SkipReason),
}

impl Disposition {
  /// The record, if this line produced one.
  pub fn into_record(self) -> Option<SlowQueryRecord> {
    match self {
      Disposition::Record(record) => Some(record),
      Disposition::Skipped(_) => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  #[test]
  fn document_node_keeps_key_order() {
    let node: DocumentNode = serde_json::from_str(r#"{"b": 1, "a": 2}"#).unwrap();
    match node {
      DocumentNode::Object(entries) => {
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["b", "a"]);
      }
      other => panic!("expected object, got {:?}", other),
    }
  }

  #[test]
  fn document_node_scalars_keep_literal_text() {
    let node: DocumentNode =
      serde_json::from_str(r#"["a", 10, 1.5, true, null]"#).unwrap();
    assert_eq!(
      node,
      DocumentNode::Array(vec![
        DocumentNode::Scalar("a".into()),
        DocumentNode::Scalar("10".into()),
        DocumentNode::Scalar("1.5".into()),
        DocumentNode::Scalar("true".into()),
        DocumentNode::Scalar("null".into()),
      ])
    );
  }

  #[test]
  fn record_serializes_with_original_field_names() {
    let record = SlowQueryRecord {
      ts: chrono::Utc.with_ymd_and_hms(2014, 9, 17, 2, 0, 43).unwrap(),
      op: "query".into(),
      ns: "mydb.coll".into(),
      command: None,
      command_detail: Some("upsert".into()),
      plan_summary: Some("IXSCAN".into()),
      query: Some("{ status }".into()),
      ms: 120,
      nscanned: Some(4),
      n_matched: Some(2),
      n_modified: None,
      num_yields: None,
      reslen: Some(20),
      lockread: None,
      lockwrite: Some(1.5),
      lockglobread: None,
      lockglobwrite: None,
    };
    let json = serde_json::to_string(&record).unwrap();
    assert!(json.contains("\"commandDetail\":\"upsert\""));
    assert!(json.contains("\"planSummary\":\"IXSCAN\""));
    assert!(json.contains("\"nMatched\":2"));
    assert!(json.contains("\"lockwrite\":1.5"));
    // Absent optionals are omitted entirely.
    assert!(!json.contains("nModified"));
    assert!(!json.contains("lockread"));
  }
}
