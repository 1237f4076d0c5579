//! Export functionality for planning diagnostics
//!
//! Currently supports CSV export of per-policy scores and their
//! expected-free-energy decomposition.

mod scores_csv;

pub use scores_csv::{ScoreRecord, ScoresCsvExporter};
