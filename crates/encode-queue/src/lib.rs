//! Priority-ordered mutual exclusion plus the two-tier job pipeline it
//! serializes: the Execution Gate, Wait Queue, and Running Set (§4.1-§4.3).
//!
//! This crate owns data structures and pure invariant checks only. The
//! Scheduler Loop, Finalization, and Process Supervisor that drive these
//! structures live in `encode-engine` and `encode-manager`.

pub mod gate;
pub mod invariants;
pub mod running_set;
pub mod wait_queue;

pub use gate::{ExecutionGate, GateGuard, Ticket};
pub use running_set::RunningSet;
pub use wait_queue::WaitQueue;
