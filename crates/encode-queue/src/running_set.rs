//! The Running Set (§4.3): jobs currently holding a process slot.

use encode_types::{JobId, RunningEntry};

/// Bounded collection of in-flight jobs, keyed by [`JobId`].
///
/// Capacity (`concurrentEncodeNum`, CAP-1) is enforced by the scheduler
/// that inserts into this set, not by the set itself — `RunningSet` only
/// reports its current size so the scheduler can compare against the
/// configured limit.
#[derive(Default)]
pub struct RunningSet {
    entries: Vec<RunningEntry>,
}

impl RunningSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: RunningEntry) {
        self.entries.push(entry);
    }

    pub fn remove(&mut self, id: JobId) -> Option<RunningEntry> {
        let pos = self.entries.iter().position(|e| e.job.id == id)?;
        Some(self.entries.remove(pos))
    }

    pub fn get(&self, id: JobId) -> Option<&RunningEntry> {
        self.entries.iter().find(|e| e.job.id == id)
    }

    pub fn get_mut(&mut self, id: JobId) -> Option<&mut RunningEntry> {
        self.entries.iter_mut().find(|e| e.job.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RunningEntry> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut RunningEntry> {
        self.entries.iter_mut()
    }

    /// Whether a running job already targets `source_video_file_id`
    /// (duplicate-source interlock, §4.4).
    pub fn contains_source(&self, source_video_file_id: u64) -> bool {
        self.entries
            .iter()
            .any(|e| e.job.request.source_video_file_id == source_video_file_id)
    }

    /// All running job ids whose request targets `recorded_id`.
    pub fn job_ids_for_recorded(&self, recorded_id: u64) -> Vec<JobId> {
        self.entries
            .iter()
            .filter(|e| e.job.request.recorded_id == recorded_id)
            .map(|e| e.job.id)
            .collect()
    }
}
