//! ID-1 (I2): a job id appears in at most one of Wait Queue or Running Set.
//! ID-2 (I3): a job transitions Wait -> Running -> (gone), never back to Wait.

use super::Violation;
use crate::{RunningSet, WaitQueue};
use std::collections::HashSet;

/// ID-1: no job id is simultaneously queued and running.
pub fn check_disjoint(wait: &WaitQueue, running: &RunningSet) -> Result<(), Violation> {
    let waiting: HashSet<u64> = wait.iter().map(|e| e.id.0).collect();
    for entry in running.iter() {
        if waiting.contains(&entry.job.id.0) {
            return Err(Violation::DuplicateJobId {
                id: entry.job.id.0,
            });
        }
    }
    Ok(())
}

/// ID-2: none of `promoted_ids` (ids that have ever been seen in the Running
/// Set) may reappear in the current Wait Queue. Callers accumulate
/// `promoted_ids` across the run; this check is a point-in-time assertion
/// against that accumulated history.
pub fn check_no_reentry(wait: &WaitQueue, promoted_ids: &HashSet<u64>) -> Result<(), Violation> {
    for entry in wait.iter() {
        if promoted_ids.contains(&entry.id.0) {
            return Err(Violation::ReenteredWaitQueue { id: entry.id.0 });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use encode_types::{JobId, JobRequest, ProcessHandle, RunningEntry, WaitEntry};
    use std::sync::Arc;

    struct NoopProcess;

    #[async_trait::async_trait]
    impl ProcessHandle for NoopProcess {
        async fn kill(&self) {}
    }

    fn wait_entry(id: u64) -> WaitEntry {
        WaitEntry {
            id: JobId(id),
            request: JobRequest {
                recorded_id: id,
                source_video_file_id: id,
                mode: "h264".to_string(),
                parent_dir: "default".to_string(),
                directory: None,
                remove_original: true,
            },
        }
    }

    #[tokio::test]
    async fn disjoint_sets_pass() {
        let mut wait = WaitQueue::new();
        wait.push_back(wait_entry(1));
        let mut running = RunningSet::new();
        let deadline = tokio::spawn(async {});
        running.insert(RunningEntry::new(wait_entry(2), Arc::new(NoopProcess), deadline));
        assert!(check_disjoint(&wait, &running).is_ok());
    }

    #[tokio::test]
    async fn overlap_is_flagged() {
        let mut wait = WaitQueue::new();
        wait.push_back(wait_entry(1));
        let mut running = RunningSet::new();
        let deadline = tokio::spawn(async {});
        running.insert(RunningEntry::new(wait_entry(1), Arc::new(NoopProcess), deadline));
        let err = check_disjoint(&wait, &running).unwrap_err();
        assert_eq!(err, Violation::DuplicateJobId { id: 1 });
    }

    #[test]
    fn reentry_after_promotion_is_flagged() {
        let mut wait = WaitQueue::new();
        wait.push_back(wait_entry(5));
        let mut promoted = HashSet::new();
        promoted.insert(5);
        let err = check_no_reentry(&wait, &promoted).unwrap_err();
        assert_eq!(err, Violation::ReenteredWaitQueue { id: 5 });
    }

    #[test]
    fn fresh_job_id_passes() {
        let mut wait = WaitQueue::new();
        wait.push_back(wait_entry(6));
        let promoted = HashSet::new();
        assert!(check_no_reentry(&wait, &promoted).is_ok());
    }
}
