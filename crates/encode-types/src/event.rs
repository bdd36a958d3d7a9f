//! Lifecycle events published by the Encode Manager to the event bus.
//!
//! Per (I5) a cancelled job emits neither [`EncodeEvent::FinishEncode`] nor
//! [`EncodeEvent::ErrorEncode`] — downstream consumers must infer terminal
//! state for a cancelled job from the absence of both, not from a dedicated
//! "cancelled" event.

use crate::job::JobId;
use serde::{Deserialize, Serialize};

/// Events published by the core to subscribers of the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EncodeEvent {
    /// A job was accepted into the Wait Queue.
    AddEncode { job_id: JobId },

    /// A job's encoder process exited successfully and was not cancelled.
    FinishEncode { record: FinishRecord },

    /// A job failed: the encoder exited non-zero, or promotion itself
    /// failed (profile/path resolution, spawn failure).
    ///
    /// Deliberately carries no job id or detail — the original source
    /// exposes this as a bare notification and callers correlate failures
    /// via logs, not via the event payload.
    ErrorEncode,
}

/// Payload of a successful, non-cancelled encode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishRecord {
    pub recorded_id: u64,
    pub video_file_id: u64,
    pub parent_dir_name: String,
    /// `directory/basename`, or just `basename` if no `directory` was given.
    pub file_path: String,
    pub full_output_path: String,
    pub mode: String,
    /// Coerced to `false` by the interlock (P5) if another pending or
    /// running job still references the same source video file.
    pub remove_original: bool,
}
