//! Collaborator traits the Process Supervisor resolves and spawns through
//! (§6 External Interfaces). Concrete, `tokio`-backed implementations live
//! in `encode-manager`; this crate only depends on the trait surface so it
//! can be exercised against in-memory fakes in its own tests.

use async_trait::async_trait;
use encode_types::{ProcessHandle, RecordedMetadata, VideoFileRecord};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Looks up recording metadata by `recordedId`.
#[async_trait]
pub trait RecordedStore: Send + Sync {
    async fn find_id(&self, recorded_id: u64) -> Option<RecordedMetadata>;
}

/// Looks up source video file metadata by `sourceVideoFileId`.
#[async_trait]
pub trait VideoFileStore: Send + Sync {
    async fn find_id(&self, video_file_id: u64) -> Option<VideoFileRecord>;
}

/// Resolves filesystem paths for a video file and a configured parent
/// directory name.
#[async_trait]
pub trait VideoUtil: Send + Sync {
    async fn get_full_file_path(&self, video_file_id: u64) -> Option<String>;
    async fn get_parent_dir_path(&self, parent_dir: &str) -> Option<String>;
}

/// Filesystem primitives the supervisor needs: existence checks, recursive
/// directory creation, and deletion of partial output.
#[async_trait]
pub trait FsUtil: Send + Sync {
    /// Probe `path`. `Err` covers both "does not exist" and any other
    /// filesystem failure; callers that only care about existence match on
    /// `is_ok()`, callers that must propagate the underlying error (§4.6
    /// step 1) use the error directly.
    async fn stat(&self, path: &Path) -> std::io::Result<()>;
    async fn mkdir_recursive(&self, path: &Path) -> std::io::Result<()>;
    async fn unlink(&self, path: &Path) -> std::io::Result<()>;
}

/// How a child process exited. `signal` is set instead of `code` when the
/// process was terminated by a signal rather than exiting normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    pub code: Option<i32>,
    pub signal: Option<i32>,
}

impl ExitOutcome {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Parameters for spawning the encoder process (§4.6 step 4).
#[derive(Debug, Clone)]
pub struct SpawnSpec {
    pub input: String,
    pub output: String,
    pub cmd: String,
    pub priority: i32,
    pub env: HashMap<String, String>,
}

/// A spawned child: a kill-capable handle plus a one-shot notification of
/// its eventual exit. The manager owns `handle` for the lifetime of the
/// Running Entry and awaits `exit` in a background task to drive the exit
/// handler (§4.6 step 6).
pub struct SpawnedChild {
    pub handle: Arc<dyn ProcessHandle>,
    pub exit: tokio::sync::oneshot::Receiver<ExitOutcome>,
}

/// Spawns the encoder process described by a [`SpawnSpec`].
#[async_trait]
pub trait ProcessManager: Send + Sync {
    async fn create(&self, spec: SpawnSpec) -> std::io::Result<SpawnedChild>;
}

/// Publishes lifecycle events to subscribers (§6).
#[async_trait]
pub trait EventEmitter: Send + Sync {
    async fn emit_add_encode(&self, job_id: encode_types::JobId);
    async fn emit_finish_encode(&self, record: encode_types::FinishRecord);
    async fn emit_error_encode(&self);
}

/// Bundles the six collaborators the Process Supervisor resolves and spawns
/// through, borrowed for the duration of a single promotion.
pub struct Collaborators<'a> {
    pub recorded_store: &'a dyn RecordedStore,
    pub video_file_store: &'a dyn VideoFileStore,
    pub video_util: &'a dyn VideoUtil,
    pub fs_util: &'a dyn FsUtil,
    pub process_manager: &'a dyn ProcessManager,
}
