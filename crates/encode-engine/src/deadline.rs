//! Process Supervisor deadline timer (§4.6 step 5): fires `on_fire` once
//! after `duration_seconds * rate`, with no further bookkeeping of its own —
//! the returned [`tokio::task::JoinHandle`] is what `RunningEntry::deadline`
//! stores, and aborting it is how (I4) clearing is implemented.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Compute the deadline duration for a job: `duration_seconds * rate`,
/// clamped to zero if either input is non-positive.
pub fn deadline_duration(duration_seconds: f64, rate: f64) -> Duration {
    let seconds = (duration_seconds * rate).max(0.0);
    Duration::from_secs_f64(seconds)
}

/// Spawn a one-shot timer that calls `on_fire` after `duration`. Dropping or
/// aborting the returned handle before it fires cancels the callback
/// (harmless per P9: firing on an already-exited job is a no-op at the
/// call site, not here).
pub fn spawn_deadline_timer<F, Fut>(duration: Duration, on_fire: F) -> JoinHandle<()>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        tokio::time::sleep(duration).await;
        debug!(?duration, "deadline elapsed, invoking cancellation callback");
        on_fire().await;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn duration_scales_by_rate() {
        assert_eq!(deadline_duration(60.0, 2.0), Duration::from_secs(120));
    }

    #[test]
    fn negative_inputs_clamp_to_zero() {
        assert_eq!(deadline_duration(-5.0, 2.0), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_invokes_callback_after_duration() {
        let fired = Arc::new(AtomicBool::new(false));
        let fired_clone = Arc::clone(&fired);
        let handle = spawn_deadline_timer(Duration::from_secs(5), move || async move {
            fired_clone.store(true, Ordering::SeqCst);
        });
        tokio::time::advance(Duration::from_secs(6)).await;
        handle.await.unwrap();
        assert!(fired.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn aborting_before_fire_prevents_callback() {
        let fired = Arc::new(AtomicBool::new(false));
        let fired_clone = Arc::clone(&fired);
        let handle = spawn_deadline_timer(Duration::from_secs(60), move || async move {
            fired_clone.store(true, Ordering::SeqCst);
        });
        handle.abort();
        let _ = handle.await;
        assert!(!fired.load(Ordering::SeqCst));
    }
}
