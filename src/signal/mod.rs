//! Signal module
//!
//! Producer-facing raw signals and the validated signal schema

mod ingest;
mod types;

pub use ingest::{clamp_conviction, ingest, IngestError};
pub use types::{Direction, Metadata, RawSignal, Signal};
