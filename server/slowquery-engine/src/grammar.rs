//! Line grammar for MongoDB slow-query log lines.
//!
//! One anchored regex with named captures recognizes the whole line; the
//! trailing run of metric tokens is captured as a blob and tokenized by a
//! second pass, since a repeated regex group only keeps its last match.

use regex::Regex;

use crate::types::RawFields;

/// Anchored line grammar. The timestamp alternation accepts the legacy
/// weekday layouts ("Wed Sep 17 10:00:43", with or without fractional
/// seconds) ahead of the single-token ISO-8601 form. The query block comes in
/// two alternatives — followed by a planSummary, or bare — under distinct
/// capture names (`regex` forbids duplicates); `parse` merges them.
const LINE_PATTERN: &str = r"^(?P<time>\w{3} \w{3} +\d{1,2} \d{2}:\d{2}:\d{2}(?:\.\d+)?|\S+) \[\w+\] (?P<op>\w+) (?P<ns>[\w-]+\.[\w$-]+)(?: (?P<command>[\w$-]+): (?:(?P<detail>\w+) )?(?:(?P<queryplan>\{.*\}) planSummary: (?P<plan>\w+(?: \{.*\})?)|(?P<query>\{.*\})))?(?P<metrics>(?: (?:\w+:\d+|locks\(micros\)))*) (?P<ms>\d+)ms$";

/// Trailing metric tokens kept by name; anything else in the tail is dropped.
const INT_METRICS: &[&str] = &["nscanned", "nMatched", "nModified", "numYields", "reslen"];

/// Single-letter lock timers, valid after a `locks(micros)` marker.
fn lock_timer_name(key: &str) -> Option<&'static str> {
  match key {
    "r" => Some("lockread"),
    "w" => Some("lockwrite"),
    "R" => Some("lockglobread"),
    "W" => Some("lockglobwrite"),
    _ => None,
  }
}

/// Compiled slow-query line grammar.
pub struct LineGrammar {
  line: Regex,
}

impl LineGrammar {
  pub fn new() -> Self {
    Self {
      line: Regex::new(LINE_PATTERN).expect("invalid line grammar"),
    }
  }

  /// Match one line (terminator already stripped) against the grammar.
  ///
  /// Returns `None` when the line is not a slow-query entry. That is the
  /// whole signal; the caller decides whether to log the skip.
  pub fn parse<'a>(&self, line: &'a str) -> Option<RawFields<'a>> {
    let caps = self.line.captures(line)?;
    let query = caps
      .name("queryplan")
      .or_else(|| caps.name("query"))
      .map(|m| m.as_str());
    Some(RawFields {
      time: caps.name("time")?.as_str(),
      op: caps.name("op")?.as_str(),
      ns: caps.name("ns")?.as_str(),
      command: caps.name("command").map(|m| m.as_str()),
      command_detail: caps.name("detail").map(|m| m.as_str()),
      query,
      plan_summary: caps.name("plan").map(|m| m.as_str()),
      ms: caps.name("ms")?.as_str(),
      metrics: tokenize_metrics(caps.name("metrics").map_or("", |m| m.as_str())),
    })
  }
}

impl Default for LineGrammar {
  fn default() -> Self {
    Self::new()
  }
}

/// Tokenize the trailing metrics blob: known `key:value` metrics map to
/// themselves, and once a `locks(micros)` marker has appeared the
/// single-letter timers r/w/R/W map to their lock names. Order-independent,
/// repeatable; unknown tokens are accepted and dropped.
fn tokenize_metrics(tail: &str) -> Vec<(&'static str, &str)> {
  let mut tokens = Vec::new();
  let mut in_lock_section = false;
  for token in tail.split_ascii_whitespace() {
    if token == "locks(micros)" {
      in_lock_section = true;
      continue;
    }
    let Some((key, value)) = token.split_once(':') else {
      continue;
    };
    if in_lock_section {
      if let Some(name) = lock_timer_name(key) {
        tokens.push((name, value));
        continue;
      }
    }
    if let Some(name) = INT_METRICS.iter().copied().find(|&m| m == key) {
      tokens.push((name, value));
    }
  }
  tokens
}

#[cfg(test)]
mod tests {
  use super::*;

  fn grammar() -> LineGrammar {
    LineGrammar::new()
  }

  #[test]
  fn parses_iso_query_line_with_plan_summary() {
    let line = "2014-09-17T10:00:43.506+0800 [conn3] query mydb.coll query: { status: \"A\", qty: { $gt: 10 } } planSummary: IXSCAN nscanned:4 nMatched:2 reslen:20 120ms";
    let fields = grammar().parse(line).unwrap();
    assert_eq!(fields.time, "2014-09-17T10:00:43.506+0800");
    assert_eq!(fields.op, "query");
    assert_eq!(fields.ns, "mydb.coll");
    assert_eq!(fields.command, Some("query"));
    assert_eq!(fields.command_detail, None);
    assert_eq!(fields.query, Some("{ status: \"A\", qty: { $gt: 10 } }"));
    assert_eq!(fields.plan_summary, Some("IXSCAN"));
    assert_eq!(fields.ms, "120");
    assert_eq!(
      fields.metrics,
      vec![("nscanned", "4"), ("nMatched", "2"), ("reslen", "20")]
    );
  }

  #[test]
  fn plan_summary_with_braces_does_not_swallow_the_query() {
    let line = "2014-09-17T10:00:43.506+0800 [conn3] query mydb.coll query: { a: 1 } planSummary: IXSCAN { a: 1 } nscanned:4 7ms";
    let fields = grammar().parse(line).unwrap();
    assert_eq!(fields.query, Some("{ a: 1 }"));
    assert_eq!(fields.plan_summary, Some("IXSCAN { a: 1 }"));
  }

  #[test]
  fn parses_bare_query_without_plan_summary() {
    let line = "2014-09-17T10:00:43.506+0800 [conn3] query mydb.coll query: { _id: ObjectId(507f1f77bcf86cd799439011) } 15ms";
    let fields = grammar().parse(line).unwrap();
    assert_eq!(
      fields.query,
      Some("{ _id: ObjectId(507f1f77bcf86cd799439011) }")
    );
    assert_eq!(fields.plan_summary, None);
  }

  #[test]
  fn parses_command_detail_word() {
    let line = "2014-09-17T10:00:43.506+0800 [conn3] update mydb.coll update: mydetail { a: 1 } 9ms";
    let fields = grammar().parse(line).unwrap();
    assert_eq!(fields.command, Some("update"));
    assert_eq!(fields.command_detail, Some("mydetail"));
    assert_eq!(fields.query, Some("{ a: 1 }"));
  }

  #[test]
  fn parses_line_without_command_section() {
    let line = "2014-09-17T10:00:43.506+0800 [conn3] getmore mydb.coll 42ms";
    let fields = grammar().parse(line).unwrap();
    assert_eq!(fields.op, "getmore");
    assert_eq!(fields.command, None);
    assert_eq!(fields.query, None);
    assert_eq!(fields.ms, "42");
    assert!(fields.metrics.is_empty());
  }

  #[test]
  fn parses_legacy_weekday_timestamps() {
    let plain = "Wed Sep 17 10:00:43 [conn3] query mydb.coll 5ms";
    assert_eq!(grammar().parse(plain).unwrap().time, "Wed Sep 17 10:00:43");

    let fractional = "Wed Sep 17 10:00:43.506 [conn3] query mydb.coll 5ms";
    assert_eq!(
      grammar().parse(fractional).unwrap().time,
      "Wed Sep 17 10:00:43.506"
    );
  }

  #[test]
  fn accepts_hyphens_and_dollar_in_namespace() {
    let line = "2014-09-17T10:00:43.506+0800 [conn3] command my-db.$cmd 3ms";
    let fields = grammar().parse(line).unwrap();
    assert_eq!(fields.ns, "my-db.$cmd");
  }

  #[test]
  fn non_matching_line_yields_none() {
    assert!(grammar().parse("not a slow query line").is_none());
    assert!(grammar().parse("").is_none());
    // Missing the trailing duration.
    assert!(grammar()
      .parse("2014-09-17T10:00:43.506+0800 [conn3] query mydb.coll")
      .is_none());
  }

  #[test]
  fn lock_timers_require_the_locks_marker() {
    let line = "2014-09-17T10:00:43.506+0800 [conn3] update mydb.coll locks(micros) r:155 w:1500 11ms";
    let fields = grammar().parse(line).unwrap();
    assert_eq!(
      fields.metrics,
      vec![("lockread", "155"), ("lockwrite", "1500")]
    );

    // Without the marker, single-letter tokens are unknown and dropped.
    let bare = "2014-09-17T10:00:43.506+0800 [conn3] update mydb.coll w:1500 11ms";
    assert!(grammar().parse(bare).unwrap().metrics.is_empty());
  }

  #[test]
  fn global_lock_timers_are_distinct_from_per_db_timers() {
    let line = "2014-09-17T10:00:43.506+0800 [conn3] update mydb.coll locks(micros) R:10 W:20 11ms";
    let fields = grammar().parse(line).unwrap();
    assert_eq!(
      fields.metrics,
      vec![("lockglobread", "10"), ("lockglobwrite", "20")]
    );
  }

  #[test]
  fn unknown_metric_tokens_are_dropped_not_fatal() {
    let line = "2014-09-17T10:00:43.506+0800 [conn3] query mydb.coll keyUpdates:0 nscanned:9 8ms";
    let fields = grammar().parse(line).unwrap();
    assert_eq!(fields.metrics, vec![("nscanned", "9")]);
  }

  #[test]
  fn metric_tokens_are_order_independent() {
    let a = "2014-09-17T10:00:43.506+0800 [conn3] query mydb.coll reslen:20 nscanned:4 8ms";
    let b = "2014-09-17T10:00:43.506+0800 [conn3] query mydb.coll nscanned:4 reslen:20 8ms";
    let fields_a = grammar().parse(a).unwrap();
    let fields_b = grammar().parse(b).unwrap();
    let mut names_a: Vec<_> = fields_a.metrics.iter().map(|(n, _)| *n).collect();
    let mut names_b: Vec<_> = fields_b.metrics.iter().map(|(n, _)| *n).collect();
    names_a.sort_unstable();
    names_b.sort_unstable();
    assert_eq!(names_a, names_b);
  }
}
