//! Job identity and the request/entry types that travel through the queue.

use serde::{Deserialize, Serialize};

/// A monotonically increasing job identifier, wrapping back to 0 at a
/// configured upper bound.
///
/// 0 is an ordinary id like any other — the wrap resets to 0, not 1, and
/// callers must not treat 0 as a sentinel for "no job".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JobId(pub u64);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Default wrap boundary: 2^53, the largest integer a JSON/JS consumer of
/// this crate's event stream can represent exactly. Implementations are
/// free to configure a smaller bound (useful for exercising the wrap path
/// in tests, see P8).
pub const DEFAULT_MAX_JOB_ID: u64 = 1u64 << 53;

/// Allocates job ids, wrapping to 0 once `max` is reached.
///
/// Owned by whatever holds the gate ticket for `ADD_ENCODE`; allocation is
/// not itself synchronized, callers serialize access externally.
#[derive(Debug, Clone)]
pub struct JobIdAllocator {
    next: u64,
    max: u64,
}

impl JobIdAllocator {
    pub fn new(max: u64) -> Self {
        Self { next: 0, max }
    }

    /// Seed the allocator near a specific value, primarily for exercising
    /// the wrap boundary in tests (P8).
    pub fn seeded(next: u64, max: u64) -> Self {
        Self { next, max }
    }

    /// Allocate the next id and advance, wrapping to 0 at `max`.
    pub fn allocate(&mut self) -> JobId {
        let id = JobId(self.next);
        self.next = if self.next + 1 >= self.max {
            0
        } else {
            self.next + 1
        };
        id
    }
}

impl Default for JobIdAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_JOB_ID)
    }
}

/// Input to `enqueue`. `mode` names an encoder profile defined by configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    pub recorded_id: u64,
    pub source_video_file_id: u64,
    pub mode: String,
    pub parent_dir: String,
    pub directory: Option<String>,
    pub remove_original: bool,
}

/// A [`JobRequest`] augmented with its assigned [`JobId`]. Lives in the Wait
/// Queue until promoted into the Running Set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitEntry {
    pub id: JobId,
    pub request: JobRequest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_wraps_to_zero_not_one() {
        let mut alloc = JobIdAllocator::seeded(4, 5);
        assert_eq!(alloc.allocate(), JobId(4));
        assert_eq!(alloc.allocate(), JobId(0));
        assert_eq!(alloc.allocate(), JobId(1));
    }

    #[test]
    fn allocator_is_sequential_below_the_cap() {
        let mut alloc = JobIdAllocator::new(DEFAULT_MAX_JOB_ID);
        assert_eq!(alloc.allocate(), JobId(0));
        assert_eq!(alloc.allocate(), JobId(1));
        assert_eq!(alloc.allocate(), JobId(2));
    }
}
