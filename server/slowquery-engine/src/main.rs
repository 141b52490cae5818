//! Binary entrypoint: read slow-query log lines from stdin, write JSON lines
//! to stdout.
//!
//! Lines that match the grammar become one JSON record each; lines that don't
//! are skipped with a diagnostic on stderr (RUST_LOG=debug to see them).
//! Records are flushed to stdout in batches; an empty batch never touches the
//! sink.

use std::io::{self, BufRead};

use slowquery_engine::{Config, Engine, EventSink, JsonLinesSink, SlowQueryRecord};

fn main() {
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
    )
    .init();

  let config = Config::default();
  let engine = Engine::new(config.clone());
  let mut sink = JsonLinesSink::new(io::BufWriter::new(io::stdout().lock()));
  let mut batch: Vec<SlowQueryRecord> = Vec::new();

  for line in io::stdin().lock().lines() {
    let line = match line {
      Ok(l) => l,
      Err(e) => {
        tracing::error!(error = %e, "stdin read error");
        std::process::exit(1);
      }
    };

    // Skip blank lines.
    if line.trim().is_empty() {
      continue;
    }

    if let Some(record) = engine.process_line(&line).into_record() {
      batch.push(record);
    }

    if batch.len() >= config.batch_lines {
      flush(&mut sink, &mut batch);
    }
  }

  flush(&mut sink, &mut batch);
}

/// Emit the batch and clear it. A sink failure drops this batch only; the
/// next batch gets a fresh attempt.
fn flush(sink: &mut impl EventSink, batch: &mut Vec<SlowQueryRecord>) {
  if batch.is_empty() {
    return;
  }
  if let Err(err) = sink.emit(batch) {
    tracing::error!(error = %err, dropped = batch.len(), "sink emission failed");
  }
  batch.clear();
}
