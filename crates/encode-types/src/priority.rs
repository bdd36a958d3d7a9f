//! Execution Gate priority constants.
//!
//! Larger values are served earlier. These are ticket priorities, not OS
//! process niceness — `ENCODE` is reserved for the latter and never appears
//! on a gate ticket.

/// Process-priority niceness hint passed to the spawned encoder. Not a gate
/// priority: no ticket is ever acquired at this level.
pub const ENCODE: i32 = 10;

/// Finalization (`finalize`). Strictly above `ADD_ENCODE`/`CREATE_PROCESS` so
/// that completing jobs make room for pending ones without being preempted
/// by new arrivals.
pub const CLEAR_QUEUE: i32 = 3;

/// `enqueue`.
pub const ADD_ENCODE: i32 = 2;

/// Promotion from the wait queue into the running set.
pub const CREATE_PROCESS: i32 = 2;

/// `cancel`.
pub const CANCEL: i32 = 1;

/// A priority level at which an Execution Gate ticket can be requested.
///
/// Wraps the raw `i32` constants above so call sites read as
/// `Priority::ADD_ENCODE` rather than a bare magic number, while the gate
/// itself only ever compares the inner value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(pub i32);

impl Priority {
    pub const CLEAR_QUEUE: Priority = Priority(CLEAR_QUEUE);
    pub const ADD_ENCODE: Priority = Priority(ADD_ENCODE);
    pub const CREATE_PROCESS: Priority = Priority(CREATE_PROCESS);
    pub const CANCEL: Priority = Priority(CANCEL);

    pub fn value(self) -> i32 {
        self.0
    }
}
