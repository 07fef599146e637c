//! `rollcall-recon` - Employee roster reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded rows and shifts, returns the
//! matched/unmatched partition with per-group attendance statistics.
//! No CLI or IO dependencies.

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod normalize;

pub use config::{DedupPolicy, ReconConfig};
pub use engine::run;
pub use error::ReconError;
pub use model::{
    EmployeeRecord, GroupStats, MatchGroup, ReconInput, ReconResult, Shift, Source, SourceRow,
};
