//! The process-side half of a Running Entry: a handle to the spawned
//! encoder child, abstracted so the queue and scheduler never depend on a
//! concrete process-spawning implementation.

use async_trait::async_trait;

/// A handle to a spawned OS child process.
///
/// Concrete implementations (e.g. one wrapping `tokio::process::Child`)
/// live with the Process Supervisor; this crate only needs the capability
/// to request termination.
#[async_trait]
pub trait ProcessHandle: Send + Sync {
    /// Request termination of the process.
    ///
    /// Per §7 propagation policy, kill errors are logged by the caller and
    /// never propagated — this method intentionally has no `Result`.
    async fn kill(&self);
}
