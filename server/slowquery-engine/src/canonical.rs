//! Canonicalize loose query-document text into strict JSON.
//!
//! The log writes query documents in MongoDB's shell notation: bare field
//! names and non-JSON literal constructors. Each rewrite rule below handles
//! one encoding; new log-format encodings get a new rule here and nowhere
//! else.

use regex::{Captures, Regex};

use crate::error::EngineError;
use crate::types::DocumentNode;

/// Rewrites loose query text to JSON and parses it into a [`DocumentNode`].
pub struct Canonicalizer {
  field_name: Regex,
  object_id: Regex,
  timestamp_pair: Regex,
  date_ctor: Regex,
  regex_literal: Regex,
}

impl Canonicalizer {
  pub fn new() -> Self {
    Self {
      field_name: Regex::new(r" ([^ ]+?): ").expect("invalid field-name pattern"),
      object_id: Regex::new(r"ObjectId\([^ ]+?\)").expect("invalid ObjectId pattern"),
      timestamp_pair: Regex::new(r"Timestamp \d+\|\d+").expect("invalid Timestamp pattern"),
      date_ctor: Regex::new(r"new Date\(\d+\)").expect("invalid Date pattern"),
      regex_literal: Regex::new(r"/\^.*/").expect("invalid regex-literal pattern"),
    }
  }

  /// Canonicalize raw query text into a parsed document.
  ///
  /// On failure the caller keeps the raw text as the record's query value;
  /// the record itself is never discarded over an unsupported encoding.
  pub fn canonicalize(&self, raw: &str) -> Result<DocumentNode, EngineError> {
    let json = self.rewrite(raw);
    Ok(serde_json::from_str(&json)?)
  }

  /// The lexical pass alone: loose query text → JSON text. Applied in rule
  /// order; literal constructors become opaque quoted strings holding the
  /// original token verbatim.
  pub fn rewrite(&self, raw: &str) -> String {
    let text = self.quote_field_names(raw);
    let text = stringify(&self.object_id, &text);
    let text = stringify(&self.timestamp_pair, &text);
    let text = stringify(&self.date_ctor, &text);
    stringify(&self.regex_literal, &text)
  }

  /// ` name: ` → ` "name": `
  fn quote_field_names(&self, text: &str) -> String {
    self.field_name.replace_all(text, r#" "${1}": "#).into_owned()
  }
}

impl Default for Canonicalizer {
  fn default() -> Self {
    Self::new()
  }
}

/// Replace every match with an opaque JSON string of the matched token,
/// internal quotes escaped.
fn stringify(re: &Regex, text: &str) -> String {
  re.replace_all(text, |caps: &Captures| opaque_string(&caps[0]))
    .into_owned()
}

fn opaque_string(raw: &str) -> String {
  format!("\"{}\"", raw.replace('"', "\\\""))
}
