//! LC-1 (I4): a Running Entry's deadline timer is cleared before removal.
//! LC-2 (I5): a cancelled entry emits neither a finish nor an error event.
//! LC-3 (I6): an abnormally-ended entry does not leave its output file behind.

use super::Violation;
use encode_types::{EncodeEvent, RunningEntry};
use std::path::Path;

/// LC-1: call immediately before removing `entry` from the Running Set.
pub fn check_deadline_cleared(entry: &RunningEntry) -> Result<(), Violation> {
    if entry.deadline.is_some() {
        return Err(Violation::DeadlineNotCleared {
            id: entry.job.id.0,
        });
    }
    Ok(())
}

/// LC-2: call with the event (if any) about to be emitted for a finished
/// entry. A cancelled entry must emit `None`.
pub fn check_silent_cancellation(
    entry: &RunningEntry,
    emitted: Option<&EncodeEvent>,
) -> Result<(), Violation> {
    if entry.cancelled && emitted.is_some() {
        return Err(Violation::CancelledEntryEmittedEvent {
            id: entry.job.id.0,
        });
    }
    Ok(())
}

/// LC-3: after abnormal supervision end (non-zero exit, cancellation, or
/// exit before the record is written), `output_path` must not exist.
pub fn check_output_cleaned_up(job_id: u64, output_path: &Path) -> Result<(), Violation> {
    if output_path.exists() {
        return Err(Violation::OrphanedOutputFile {
            id: job_id,
            path: output_path.display().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use encode_types::{JobId, JobRequest, ProcessHandle, WaitEntry};
    use std::sync::Arc;

    struct NoopProcess;

    #[async_trait::async_trait]
    impl ProcessHandle for NoopProcess {
        async fn kill(&self) {}
    }

    fn entry(cancelled: bool, with_deadline: bool) -> RunningEntry {
        let job = WaitEntry {
            id: JobId(1),
            request: JobRequest {
                recorded_id: 1,
                source_video_file_id: 1,
                mode: "h264".to_string(),
                parent_dir: "default".to_string(),
                directory: None,
                remove_original: true,
            },
        };
        let deadline = tokio::spawn(async {});
        let mut e = RunningEntry::new(job, Arc::new(NoopProcess), deadline);
        e.cancelled = cancelled;
        if !with_deadline {
            e.clear_deadline();
        }
        e
    }

    #[tokio::test]
    async fn cleared_deadline_passes() {
        let e = entry(false, false);
        assert!(check_deadline_cleared(&e).is_ok());
    }

    #[tokio::test]
    async fn live_deadline_is_flagged() {
        let e = entry(false, true);
        let err = check_deadline_cleared(&e).unwrap_err();
        assert_eq!(err, Violation::DeadlineNotCleared { id: 1 });
    }

    #[tokio::test]
    async fn cancelled_entry_with_no_event_passes() {
        let e = entry(true, false);
        assert!(check_silent_cancellation(&e, None).is_ok());
    }

    #[tokio::test]
    async fn cancelled_entry_emitting_finish_is_flagged() {
        let e = entry(true, false);
        let event = EncodeEvent::AddEncode { job_id: JobId(1) };
        let err = check_silent_cancellation(&e, Some(&event)).unwrap_err();
        assert_eq!(err, Violation::CancelledEntryEmittedEvent { id: 1 });
    }

    #[test]
    fn missing_output_file_passes() {
        let path = std::path::Path::new("/tmp/encode-queue-lifecycle-test-missing-file.mp4");
        assert!(check_output_cleaned_up(1, path).is_ok());
    }
}
