//! MongoDB slow-query log normalizer — deterministic, per-line.
//!
//! Parses slow-query log lines into structured records and derives a
//! canonical "query shape" from the embedded query text (field paths kept,
//! literal values dropped) so that operationally identical queries group
//! together.
//!
//! No database, no network; pure per-line computation. Every failure is
//! contained at the single-line boundary: a malformed line becomes a typed
//! skip and an unsupported query encoding falls back to the raw text, with
//! the rest of the batch never affected.

pub mod canonical;
pub mod coerce;
pub mod config;
pub mod engine;
pub mod error;
pub mod grammar;
pub mod shape;
pub mod sink;
pub mod types;

pub use config::Config;
pub use engine::Engine;
pub use error::EngineError;
pub use sink::{EventSink, JsonLinesSink};
pub use types::{Disposition, SkipReason, SlowQueryRecord};
