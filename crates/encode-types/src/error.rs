//! Errors raised by the encode manager's public operations and by the
//! Process Supervisor during job promotion.

use crate::job::JobId;
use thiserror::Error;

/// Errors surfaced by `enqueue`, `cancel`, `cancelByRecordedId`, and by the
/// Scheduler Loop when promotion fails.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Raised at `enqueue` when `concurrentEncodeNum` is configured as zero
    /// or negative.
    #[error("concurrent encode num is zero")]
    ConcurrentEncodeNumIsZero,

    /// The Execution Gate was not granted within 60 s.
    #[error("timed out waiting to acquire the execution gate")]
    GetExecutionTimeout,

    /// The video file store has no record for the requested id.
    #[error("video file id {0} is not found")]
    VideoFileIdIsNotFound(u64),

    /// The recorded metadata store has no record for the requested id.
    #[error("recorded id {0} is not found")]
    RecordedIsNotFound(u64),

    /// The video util could not resolve a filesystem path for the video file.
    #[error("video path for video file id {0} is not found")]
    VideoPathIsNotFound(u64),

    /// No configured encode profile has a `name` matching the job's `mode`.
    #[error("encode command for mode {0:?} is not found")]
    EncodeCommandIsNotFound(String),

    /// The configured parent directory name has no resolvable path.
    #[error("parent dir {0:?} is not found")]
    ParentDirIsNotFound(String),

    /// The filename-collision search exhausted its bounded retry budget.
    #[error("could not find a free output path for {0:?} after exhausting retries")]
    GetFilePathError(String),

    /// Raised by `cancelByRecordedId` when one or more of the underlying
    /// `cancel` calls failed; every matching job is still attempted.
    #[error("{0} of {1} cancel operations failed for recorded id")]
    StopEncodeError(usize, usize),

    /// Propagated filesystem error from stat/mkdir/unlink.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the Process Supervisor's resolution phase (§4.6 steps 1-3),
/// folded into [`EncodeError`] at the Scheduler Loop boundary (§4.4 step 6).
#[derive(Debug, Error)]
pub enum PromotionError {
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The supervisor could not spawn the encoder process at all.
    #[error("failed to spawn encoder for job {job_id}: {source}")]
    SpawnFailed {
        job_id: JobId,
        #[source]
        source: std::io::Error,
    },
}

/// Errors loading the JSON-backed [`crate::record::Configuration`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path:?}: {source}")]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration file {path:?}: {source}")]
    Parse {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("duplicate encode profile name {0:?}")]
    DuplicateProfileName(String),
}
