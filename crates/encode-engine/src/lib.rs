//! The Process Supervisor (§4.6): resolves a promoted job's inputs,
//! encoder profile, and output path, then spawns and arms its deadline
//! timer.
//!
//! This crate is deliberately ignorant of the Wait Queue, Running Set, and
//! Execution Gate — it resolves and spawns, and hands the caller a
//! [`SpawnedChild`] plus deadline handle to install into a `RunningEntry`.
//! The exit-handler branching in §4.6 step 6 (cancelled/failure/success,
//! the duplicate-source interlock, event emission, and `finalize`) needs
//! Running Set visibility and lives in `encode-manager`.

pub mod collaborators;
pub mod deadline;
pub mod resolve;
pub mod spawn;

pub use collaborators::{
    Collaborators, EventEmitter, ExitOutcome, FsUtil, ProcessManager, RecordedStore, SpawnSpec,
    SpawnedChild, VideoFileStore, VideoUtil,
};
pub use deadline::{deadline_duration, spawn_deadline_timer};
pub use resolve::{resolve, Resolution, ResolvedOutput};
pub use spawn::{build_env, spawn};
