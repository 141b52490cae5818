//! Engine configuration with sane defaults.

/// Tunable knobs for line processing.
#[derive(Debug, Clone)]
pub struct Config {
  /// Year assumed for the year-less legacy timestamp layouts
  /// ("Wed Sep 17 10:00:43"). `None` uses the current year at engine
  /// construction.
  pub assumed_year: Option<i32>,
  /// Derive a query shape fingerprint from the query text. When off the raw
  /// query text is kept as-is.
  pub fingerprint_queries: bool,
  /// Lines per sink flush in the stdin harness.
  pub batch_lines: usize,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      assumed_year: None,
      fingerprint_queries: true,
      batch_lines: 256,
    }
  }
}
