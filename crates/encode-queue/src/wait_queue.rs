//! The Wait Queue (§4.2): FIFO holding area for jobs not yet promoted to
//! the Running Set.

use encode_types::{JobId, WaitEntry};

/// FIFO queue of jobs awaiting a free Running Set slot.
///
/// Plain `Vec`-backed: the queue is walked in full on every scheduler tick
/// (to find the next promotable job and to check the duplicate-source
/// interlock), so a `VecDeque`'s O(1) pop buys nothing a linear scan
/// doesn't already pay for.
#[derive(Default)]
pub struct WaitQueue {
    entries: Vec<WaitEntry>,
}

impl WaitQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_back(&mut self, entry: WaitEntry) {
        self.entries.push(entry);
    }

    /// Remove and return the first entry, if any.
    pub fn pop_front(&mut self) -> Option<WaitEntry> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.remove(0))
        }
    }

    /// Remove a specific job by id, wherever it sits in the queue.
    pub fn remove(&mut self, id: JobId) -> Option<WaitEntry> {
        let pos = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(pos))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WaitEntry> {
        self.entries.iter()
    }

    /// Whether another pending job already targets `source_video_file_id`
    /// (duplicate-source interlock, §4.4).
    pub fn contains_source(&self, source_video_file_id: u64) -> bool {
        self.entries
            .iter()
            .any(|e| e.request.source_video_file_id == source_video_file_id)
    }

    /// All queued job ids whose request targets `recorded_id`.
    pub fn job_ids_for_recorded(&self, recorded_id: u64) -> Vec<JobId> {
        self.entries
            .iter()
            .filter(|e| e.request.recorded_id == recorded_id)
            .map(|e| e.id)
            .collect()
    }
}
