//! Per-line processing: grammar match → canonicalize → shape → coerce.

use chrono::{Datelike, Utc};
use tracing::{debug, warn};

use crate::canonical::Canonicalizer;
use crate::coerce;
use crate::config::Config;
use crate::grammar::LineGrammar;
use crate::shape;
use crate::types::{Disposition, RawFields, SkipReason, SlowQueryRecord};

/// The slow-query line processor. Holds only immutable pieces (compiled
/// grammar + config), so one engine is safe to share across threads; every
/// call allocates its own ephemeral document tree.
pub struct Engine {
  grammar: LineGrammar,
  canonicalizer: Canonicalizer,
  assumed_year: i32,
  fingerprint_queries: bool,
}

impl Engine {
  pub fn new(config: Config) -> Self {
    let assumed_year = config.assumed_year.unwrap_or_else(|| Utc::now().year());
    Self {
      grammar: LineGrammar::new(),
      canonicalizer: Canonicalizer::new(),
      assumed_year,
      fingerprint_queries: config.fingerprint_queries,
    }
  }

  pub fn with_defaults() -> Self {
    Self::new(Config::default())
  }

  /// Process a single raw log line into zero-or-one record.
  ///
  /// Every failure mode is contained here: a non-matching line or an
  /// unparseable timestamp becomes a typed skip, an uncanonicalizable query
  /// keeps its raw text, and an unparsable metric coerces to zero. Nothing a
  /// line does can affect any other line.
  pub fn process_line(&self, line: &str) -> Disposition {
    let line = line.trim_end_matches('\n').trim_end_matches('\r');

    let Some(fields) = self.grammar.parse(line) else {
      debug!(line, "line does not match the slow-query grammar");
      return Disposition::Skipped(SkipReason::NoMatch);
    };

    let ts = match coerce::parse_timestamp(fields.time, self.assumed_year) {
      Ok(ts) => ts,
      Err(err) => {
        debug!(error = %err, line, "skipping line with unparseable timestamp");
        return Disposition::Skipped(SkipReason::BadTimestamp);
      }
    };

    let query = fields.query.map(|raw| self.fingerprint(raw));

    let mut record = SlowQueryRecord {
      ts,
      op: fields.op.to_string(),
      ns: fields.ns.to_string(),
      command: fields.command.map(str::to_string),
      command_detail: fields.command_detail.map(str::to_string),
      plan_summary: fields.plan_summary.map(str::to_string),
      query,
      ms: coerce::int_or_zero(fields.ms),
      nscanned: None,
      n_matched: None,
      n_modified: None,
      num_yields: None,
      reslen: None,
      lockread: None,
      lockwrite: None,
      lockglobread: None,
      lockglobwrite: None,
    };
    apply_metrics(&mut record, &fields);

    Disposition::Record(record)
  }

  /// Process a batch of lines. One line's failure never affects, skips, or
  /// corrupts its siblings.
  pub fn process_batch<'i, I>(&self, lines: I) -> Vec<SlowQueryRecord>
  where
    I: IntoIterator<Item = &'i str>,
  {
    lines
      .into_iter()
      .filter_map(|line| self.process_line(line).into_record())
      .collect()
  }

  /// Shape of the query text, or the raw text when canonicalization fails.
  fn fingerprint(&self, raw: &str) -> String {
    if !self.fingerprint_queries {
      return raw.to_string();
    }
    match self.canonicalizer.canonicalize(raw) {
      Ok(doc) => shape::shape_of(&doc),
      Err(err) => {
        warn!(error = %err, query = raw, "query canonicalization failed, keeping raw text");
        raw.to_string()
      }
    }
  }
}

/// Copy coerced metric values onto the record. Names repeat freely in the
/// trailing tokens; the last occurrence wins.
fn apply_metrics(record: &mut SlowQueryRecord, fields: &RawFields) {
  for (name, raw) in &fields.metrics {
    match *name {
      "nscanned" => record.nscanned = Some(coerce::int_or_zero(raw)),
      "nMatched" => record.n_matched = Some(coerce::int_or_zero(raw)),
      "nModified" => record.n_modified = Some(coerce::int_or_zero(raw)),
      "numYields" => record.num_yields = Some(coerce::int_or_zero(raw)),
      "reslen" => record.reslen = Some(coerce::int_or_zero(raw)),
      "lockread" => record.lockread = Some(coerce::lock_millis(raw)),
      "lockwrite" => record.lockwrite = Some(coerce::lock_millis(raw)),
      "lockglobread" => record.lockglobread = Some(coerce::lock_millis(raw)),
      "lockglobwrite" => record.lockglobwrite = Some(coerce::lock_millis(raw)),
      _ => {}
    }
  }
}
