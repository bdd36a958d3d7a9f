//! The Running Set's element type (§3 Running Entry).

use crate::job::WaitEntry;
use crate::process::ProcessHandle;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// A promoted job with its live process and deadline timer.
///
/// `cancelled` distinguishes operator-initiated termination from process
/// failure (I5): when true, the exit handler emits neither a finish nor an
/// error event.
pub struct RunningEntry {
    pub job: WaitEntry,
    pub process: Arc<dyn ProcessHandle>,
    pub cancelled: bool,
    /// The deadline timer task. `None` once cleared (I4: cleared before the
    /// entry is removed from the Running Set).
    pub deadline: Option<JoinHandle<()>>,
}

impl RunningEntry {
    pub fn new(job: WaitEntry, process: Arc<dyn ProcessHandle>, deadline: JoinHandle<()>) -> Self {
        Self {
            job,
            process,
            cancelled: false,
            deadline: Some(deadline),
        }
    }

    /// Abort and drop the deadline timer (I4). Idempotent.
    pub fn clear_deadline(&mut self) {
        if let Some(handle) = self.deadline.take() {
            handle.abort();
        }
    }
}
