//! Delivery of finished records downstream.

use std::io::Write;

use crate::error::EngineError;
use crate::types::SlowQueryRecord;

/// Accepts batches of finished records. Callers never invoke a sink with an
/// empty batch; retry and backpressure are the sink's own business.
pub trait EventSink {
  fn emit(&mut self, records: &[SlowQueryRecord]) -> Result<(), EngineError>;
}

/// Writes one JSON object per record, newline-delimited.
pub struct JsonLinesSink<W: Write> {
  out: W,
}

impl<W: Write> JsonLinesSink<W> {
  pub fn new(out: W) -> Self {
    Self { out }
  }

  pub fn into_inner(self) -> W {
    self.out
  }
}

impl<W: Write> EventSink for JsonLinesSink<W> {
  fn emit(&mut self, records: &[SlowQueryRecord]) -> Result<(), EngineError> {
    for record in records {
      serde_json::to_writer(&mut self.out, record)?;
      self.out.write_all(b"\n")?;
    }
    self.out.flush()?;
    Ok(())
  }
}
