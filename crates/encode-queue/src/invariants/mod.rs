//! Queue invariant checking.
//!
//! Pure, side-effect-free checks over a snapshot of queue state, grouped by
//! concern (7 checks total):
//! - [`capacity`] (CAP-1): Running Set never exceeds `concurrentEncodeNum` (I1).
//! - [`identity`] (ID-1, ID-2): job id uniqueness and one-way promotion (I2, I3).
//! - [`gate_order`] (GATE-1): the gate's waiter queue is priority-sorted, FIFO
//!   within a priority (P4).
//! - [`lifecycle`] (LC-1, LC-2, LC-3): deadline-timer clearing, silent
//!   cancellation, and orphaned-output cleanup (I4, I5, I6).
//!
//! Each sub-module exposes a `check` function taking the relevant state by
//! reference and returning `Result<(), Violation>`. Nothing here mutates
//! queue state or the gate — these are assertions the scheduler and the
//! test suite both call after the fact.

pub mod capacity;
pub mod gate_order;
pub mod identity;
pub mod lifecycle;

use std::fmt;

/// A detected invariant violation, tagged the way the checks are named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// CAP-1 (I1): Running Set size exceeded the configured concurrency cap.
    OverCapacity { len: usize, limit: usize },
    /// ID-1 (I2): a job id is present in both the Wait Queue and Running Set.
    DuplicateJobId { id: u64 },
    /// ID-2 (I3): a job id reappeared in the Wait Queue after having already
    /// been promoted to the Running Set.
    ReenteredWaitQueue { id: u64 },
    /// GATE-1 (P4): the gate's waiter queue is not sorted by non-increasing
    /// priority, or is not FIFO within a priority level.
    GateOutOfOrder { position: usize },
    /// LC-1 (I4): a Running Entry was removed from the Running Set while its
    /// deadline timer was still live.
    DeadlineNotCleared { id: u64 },
    /// LC-2 (I5): a cancelled Running Entry emitted a finish or error event.
    CancelledEntryEmittedEvent { id: u64 },
    /// LC-3 (I6): an abnormal exit left the output file behind.
    OrphanedOutputFile { id: u64, path: String },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::OverCapacity { len, limit } => {
                write!(f, "CAP-1: running set size {len} exceeds limit {limit}")
            }
            Violation::DuplicateJobId { id } => {
                write!(f, "ID-1: job {id} present in both wait queue and running set")
            }
            Violation::ReenteredWaitQueue { id } => {
                write!(f, "ID-2: job {id} re-entered the wait queue after promotion")
            }
            Violation::GateOutOfOrder { position } => {
                write!(f, "GATE-1: waiter queue out of order at position {position}")
            }
            Violation::DeadlineNotCleared { id } => {
                write!(f, "LC-1: deadline timer for job {id} was not cleared before removal")
            }
            Violation::CancelledEntryEmittedEvent { id } => {
                write!(f, "LC-2: cancelled job {id} emitted a finish/error event")
            }
            Violation::OrphanedOutputFile { id, path } => {
                write!(f, "LC-3: job {id} left output file behind at {path}")
            }
        }
    }
}

impl std::error::Error for Violation {}
