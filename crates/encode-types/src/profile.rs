//! Encoder profiles: named entries in configuration selected by a job's `mode`.

use serde::{Deserialize, Serialize};

/// Deadline multiplier applied when a profile does not specify its own `rate`.
pub const DEFAULT_RATE: f64 = 4.0;

/// A named encoder profile from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodeProfile {
    pub name: String,
    /// Command template string with placeholders resolved by the
    /// collaborator that actually spawns the process; this crate forwards
    /// it verbatim.
    pub cmd: String,
    /// Output extension. Absent means the encoder writes no output this
    /// manager tracks.
    pub suffix: Option<String>,
    /// Deadline multiplier: the per-job deadline is `duration_seconds × rate`.
    pub rate: Option<f64>,
}

impl EncodeProfile {
    /// The effective deadline multiplier, falling back to [`DEFAULT_RATE`].
    pub fn effective_rate(&self) -> f64 {
        self.rate.unwrap_or(DEFAULT_RATE)
    }
}
