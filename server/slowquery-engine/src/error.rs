//! Structured error types for the slow-query engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
  #[error("timestamp: unrecognized layout: {0:?}")]
  Timestamp(String),

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),

  #[error("sink: {0}")]
  Sink(#[from] std::io::Error),
}
