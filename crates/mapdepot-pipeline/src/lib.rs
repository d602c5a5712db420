//! The build pipeline, end to end:
//!
//! ```text
//! scan -> validate (parallel) -> merge -> paginate -> stage -> persist -> report
//! ```
//!
//! Per-map failures are isolated into [`MapOutcome`]s; only
//! configuration, source, store-conflict, and write errors abort a run,
//! and every abort before the persist step leaves prior published state
//! untouched.

pub mod error;
pub mod outcome;
pub mod run;
pub mod stage;
pub mod validate;

pub use error::FatalError;
pub use outcome::{BuildRun, MapOutcome, OutcomeKind, RunCounts};
pub use run::{PipelineConfig, RunMode, run};
pub use validate::AcceptedMap;
