//! Query shape extraction: the ordered field-path skeleton of a document.
//!
//! Scalar values under object keys are dropped (only the key path survives),
//! so structurally identical queries collapse to one shape. Scalar elements
//! of an array keep their literal text as a path segment: a value-list
//! operator like `$in: [1, 2]` stays distinguishable from `$in: [1]`.

use crate::types::DocumentNode;

/// Derive the shape string for a parsed query document.
pub fn shape_of(root: &DocumentNode) -> String {
  let mut leaves = Vec::new();
  match root {
    DocumentNode::Object(entries) => collect_object(entries, "", &mut leaves),
    DocumentNode::Array(items) => collect_array(items, "", &mut leaves),
    DocumentNode::Scalar(_) => {}
  }
  format!("{{ {} }}", leaves.join(", "))
}

fn collect_object(entries: &[(String, DocumentNode)], parent: &str, out: &mut Vec<String>) {
  for (key, value) in entries {
    let path = join(parent, key);
    match value {
      DocumentNode::Scalar(_) => out.push(path),
      DocumentNode::Object(inner) => collect_object(inner, &path, out),
      DocumentNode::Array(items) => collect_array(items, &path, out),
    }
  }
}

/// Arrays fan out under their own path: no extra nesting level for the array
/// itself.
fn collect_array(items: &[DocumentNode], path: &str, out: &mut Vec<String>) {
  for item in items {
    match item {
      DocumentNode::Object(inner) => collect_object(inner, path, out),
      DocumentNode::Scalar(text) => out.push(join(path, text)),
      DocumentNode::Array(inner) => collect_array(inner, path, out),
    }
  }
}

fn join(parent: &str, segment: &str) -> String {
  if parent.is_empty() {
    segment.to_string()
  } else {
    format!("{}.{}", parent, segment)
  }
}
