//! The Encode Manager: ties the Execution Gate, Wait Queue, and Running Set
//! (`encode-queue`) to the Process Supervisor (`encode-engine`) and exposes
//! the four Public Operations (§4.7).

use encode_engine::{
    self, Collaborators, EventEmitter, FsUtil, ProcessManager, RecordedStore, VideoFileStore,
    VideoUtil,
};
use encode_types::{
    priority, Configuration, EncodeError, JobId, JobIdAllocator, JobRequest, Priority,
    RunningEntry, WaitEntry,
};
use encode_queue::{ExecutionGate, RunningSet, WaitQueue};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

struct QueueState {
    wait: WaitQueue,
    running: RunningSet,
    id_alloc: JobIdAllocator,
}

/// The long-lived core described in §2. Cheap to clone via `Arc`; all
/// public operations take `self: &Arc<Self>` since several of them spawn
/// detached follow-up work (the deadline callback, the deferred scheduler
/// trigger).
pub struct EncodeManager {
    gate: Arc<ExecutionGate>,
    state: Mutex<QueueState>,
    config: Configuration,
    recorded_store: Arc<dyn RecordedStore>,
    video_file_store: Arc<dyn VideoFileStore>,
    video_util: Arc<dyn VideoUtil>,
    fs_util: Arc<dyn FsUtil>,
    process_manager: Arc<dyn ProcessManager>,
    event_emitter: Arc<dyn EventEmitter>,
}

impl EncodeManager {
    pub fn new(
        config: Configuration,
        recorded_store: Arc<dyn RecordedStore>,
        video_file_store: Arc<dyn VideoFileStore>,
        video_util: Arc<dyn VideoUtil>,
        fs_util: Arc<dyn FsUtil>,
        process_manager: Arc<dyn ProcessManager>,
        event_emitter: Arc<dyn EventEmitter>,
    ) -> Arc<Self> {
        Arc::new(Self {
            gate: ExecutionGate::new(),
            state: Mutex::new(QueueState {
                wait: WaitQueue::new(),
                running: RunningSet::new(),
                id_alloc: JobIdAllocator::default(),
            }),
            config,
            recorded_store,
            video_file_store,
            video_util,
            fs_util,
            process_manager,
            event_emitter,
        })
    }

    /// §4.7 `enqueue`.
    pub async fn enqueue(self: &Arc<Self>, request: JobRequest) -> Result<JobId, EncodeError> {
        if self.config.concurrent_encode_num <= 0 {
            return Err(EncodeError::ConcurrentEncodeNumIsZero);
        }

        let guard = self.gate.acquire_guard(Priority::ADD_ENCODE.value()).await?;
        self.debug_check_gate_order().await;
        let job_id = {
            let mut state = self.state.lock().await;
            let id = state.id_alloc.allocate();
            state.wait.push_back(WaitEntry { id, request });
            id
        };
        guard.release().await;

        debug!(%job_id, "job enqueued");
        self.trigger_check_queue();
        self.event_emitter.emit_add_encode(job_id).await;
        Ok(job_id)
    }

    /// §4.7 `cancel`. A no-op on an unknown id (P6).
    pub async fn cancel(self: &Arc<Self>, job_id: JobId) -> Result<(), EncodeError> {
        let guard = self.gate.acquire_guard(priority::CANCEL).await?;
        self.debug_check_gate_order().await;
        let mut kill_handle = None;
        let mut removed_from_wait = false;
        {
            let mut state = self.state.lock().await;
            if let Some(entry) = state.running.get_mut(job_id) {
                entry.cancelled = true;
                kill_handle = Some(Arc::clone(&entry.process));
            } else {
                removed_from_wait = state.wait.remove(job_id).is_some();
            }
        }
        guard.release().await;

        if let Some(handle) = kill_handle {
            debug!(%job_id, "killing running encoder");
            handle.kill().await;
        }
        if removed_from_wait {
            debug!(%job_id, "removed job from wait queue");
            self.trigger_check_queue();
        }
        Ok(())
    }

    /// §4.7 `cancelByRecordedId`. Attempts every matching job regardless of
    /// earlier failures, then reports an aggregate error if any failed.
    pub async fn cancel_by_recorded_id(self: &Arc<Self>, recorded_id: u64) -> Result<(), EncodeError> {
        let ids = {
            let state = self.state.lock().await;
            let mut ids = state.running.job_ids_for_recorded(recorded_id);
            ids.extend(state.wait.job_ids_for_recorded(recorded_id));
            ids
        };
        let total = ids.len();
        let mut failed = 0usize;
        for id in ids {
            if self.cancel(id).await.is_err() {
                failed += 1;
            }
        }
        if failed > 0 {
            return Err(EncodeError::StopEncodeError(failed, total));
        }
        Ok(())
    }

    /// §4.7 `getRecordedIndex`. Snapshots the Running Set then the Wait
    /// Queue, in that order.
    pub async fn get_recorded_index(&self) -> HashMap<u64, Vec<(JobId, String)>> {
        let state = self.state.lock().await;
        let mut index: HashMap<u64, Vec<(JobId, String)>> = HashMap::new();
        for entry in state.running.iter() {
            index
                .entry(entry.job.request.recorded_id)
                .or_default()
                .push((entry.job.id, entry.job.request.mode.clone()));
        }
        for entry in state.wait.iter() {
            index
                .entry(entry.request.recorded_id)
                .or_default()
                .push((entry.id, entry.request.mode.clone()));
        }
        index
    }

    /// Deferred via `tokio::spawn` per §9 so a burst of completions cannot
    /// recurse `check_queue` directly into itself.
    fn trigger_check_queue(self: &Arc<Self>) {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.check_queue().await;
        });
    }

    /// §4.4 `checkQueue`. Idempotent and safe to call spuriously (P7).
    ///
    /// The cheap pre-check below (no ticket held) is only an optimization to
    /// avoid contending for the gate when there is plainly nothing to do;
    /// it is *not* where capacity is enforced. Concurrent triggers (a burst
    /// of enqueues/finalizes each calling `trigger_check_queue`) can all
    /// pass this pre-check before any of them holds the `CREATE_PROCESS`
    /// ticket, so the authoritative check — and the only one (I1/P1)
    /// depends on — happens again once the ticket is actually held (below),
    /// which serializes it against every other promotion.
    pub async fn check_queue(self: &Arc<Self>) {
        let should_proceed = {
            let state = self.state.lock().await;
            let limit = self.config.concurrent_encode_num.max(0) as usize;
            state.running.len() < limit && !state.wait.is_empty()
        };
        if !should_proceed {
            return;
        }

        let guard = match self.gate.acquire_guard(priority::CREATE_PROCESS).await {
            Ok(guard) => guard,
            Err(e) => {
                error!(error = %e, "scheduler could not acquire execution gate");
                return;
            }
        };
        self.debug_check_gate_order().await;

        let limit = self.config.concurrent_encode_num.max(0) as usize;
        let wait_entry = {
            let mut state = self.state.lock().await;
            if state.running.len() >= limit {
                None
            } else {
                state.wait.pop_front()
            }
        };
        let Some(wait_entry) = wait_entry else {
            guard.release().await;
            return;
        };

        match self.promote(&wait_entry).await {
            Ok(running_entry) => {
                let job_id = running_entry.job.id;
                {
                    let mut state = self.state.lock().await;
                    state.running.insert(running_entry);
                    debug_assert!(
                        encode_queue::invariants::capacity::check(
                            &state.running,
                            self.config.concurrent_encode_num
                        )
                        .is_ok(),
                        "CAP-1 violated after promoting job {job_id}"
                    );
                    debug_assert!(
                        encode_queue::invariants::identity::check_disjoint(&state.wait, &state.running)
                            .is_ok(),
                        "ID-1 violated after promoting job {job_id}"
                    );
                }
                guard.release().await;
                info!(%job_id, "job promoted to running set");
            }
            Err(err) => {
                guard.release().await;
                error!(job_id = %wait_entry.id, error = %err, "promotion failed");
                self.event_emitter.emit_error_encode().await;
                self.finalize(wait_entry.id).await;
            }
        }
    }

    /// GATE-1 (P4): verify the gate's remaining waiter queue is still
    /// priority-sorted (FIFO within a priority) immediately after this call's
    /// own acquisition. Compiles away entirely in release builds.
    async fn debug_check_gate_order(&self) {
        debug_assert!(
            encode_queue::invariants::gate_order::check(&self.gate.snapshot_queue().await).is_ok(),
            "GATE-1 violated: gate waiter queue is out of priority/arrival order"
        );
    }

    /// §4.6 steps 1-5: resolve, spawn, and arm the deadline timer. Installs
    /// the background exit watcher that will drive step 6 when the
    /// process exits.
    async fn promote(
        self: &Arc<Self>,
        wait_entry: &WaitEntry,
    ) -> Result<RunningEntry, encode_types::PromotionError> {
        let collaborators = Collaborators {
            recorded_store: self.recorded_store.as_ref(),
            video_file_store: self.video_file_store.as_ref(),
            video_util: self.video_util.as_ref(),
            fs_util: self.fs_util.as_ref(),
            process_manager: self.process_manager.as_ref(),
        };

        let resolution = encode_engine::resolve(&collaborators, &wait_entry.request, &self.config).await?;
        let env = encode_engine::build_env(
            &wait_entry.request,
            &resolution.recorded,
            &resolution,
            &self.config.ffmpeg,
        );
        let spawned = encode_engine::spawn(
            self.process_manager.as_ref(),
            wait_entry.id,
            &resolution,
            env,
        )
        .await?;

        let deadline_duration =
            encode_engine::deadline_duration(resolution.duration_seconds(), resolution.profile.effective_rate());
        let job_id = wait_entry.id;
        let this = Arc::clone(self);
        let deadline = encode_engine::spawn_deadline_timer(deadline_duration, move || async move {
            warn!(%job_id, "deadline elapsed, cancelling job");
            let _ = this.cancel(job_id).await;
        });

        let running_entry = RunningEntry::new(wait_entry.clone(), Arc::clone(&spawned.handle), deadline);
        self.spawn_exit_watcher(job_id, spawned.exit, resolution);
        Ok(running_entry)
    }

    /// Awaits the child's eventual exit off to the side of `promote` so the
    /// gate ticket for promotion can be released immediately; drives §4.6
    /// step 6 when the process exits.
    fn spawn_exit_watcher(
        self: &Arc<Self>,
        job_id: JobId,
        exit: tokio::sync::oneshot::Receiver<encode_engine::ExitOutcome>,
        resolution: encode_engine::Resolution,
    ) {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = match exit.await {
                Ok(outcome) => outcome,
                Err(_) => {
                    error!(%job_id, "exit notification channel dropped without a result");
                    return;
                }
            };
            this.handle_exit(job_id, outcome, resolution).await;
        });
    }

    /// §4.6 step 6.
    async fn handle_exit(
        self: &Arc<Self>,
        job_id: JobId,
        outcome: encode_engine::ExitOutcome,
        resolution: encode_engine::Resolution,
    ) {
        let (cancelled, request) = {
            let state = self.state.lock().await;
            match state.running.get(job_id) {
                Some(entry) => (entry.cancelled, entry.job.request.clone()),
                None => {
                    error!(%job_id, "running entry absent at exit time");
                    return;
                }
            }
        };

        if cancelled {
            info!(%job_id, "job exit observed after cancellation, emitting nothing");
            self.cleanup_output(job_id, &resolution).await;
            self.debug_check_output_cleaned_up(job_id, &resolution);
            self.finalize(job_id).await;
            return;
        }

        if !outcome.success() {
            warn!(%job_id, ?outcome, "job failed");
            self.cleanup_output(job_id, &resolution).await;
            self.debug_check_output_cleaned_up(job_id, &resolution);
            self.debug_check_silent_cancellation(job_id, &encode_types::EncodeEvent::ErrorEncode)
                .await;
            self.event_emitter.emit_error_encode().await;
            self.finalize(job_id).await;
            return;
        }

        let Some(output) = resolution.output else {
            info!(%job_id, "job finished with no tracked output");
            self.finalize(job_id).await;
            return;
        };

        let mut remove_original = request.remove_original;
        if remove_original {
            let state = self.state.lock().await;
            let duplicate = state.wait.contains_source(request.source_video_file_id)
                || state
                    .running
                    .iter()
                    .any(|e| e.job.id != job_id && e.job.request.source_video_file_id == request.source_video_file_id);
            if duplicate {
                remove_original = false;
            }
        }

        let record = encode_types::FinishRecord {
            recorded_id: request.recorded_id,
            video_file_id: request.source_video_file_id,
            parent_dir_name: output.parent_dir_name,
            file_path: output.relative_file_path,
            full_output_path: output.full_path.display().to_string(),
            mode: request.mode,
            remove_original,
        };
        info!(%job_id, recorded_id = record.recorded_id, "job finished successfully");
        let event = encode_types::EncodeEvent::FinishEncode { record: record.clone() };
        self.debug_check_silent_cancellation(job_id, &event).await;
        self.event_emitter.emit_finish_encode(record).await;
        self.finalize(job_id).await;
    }

    /// LC-2 (I5): a cancelled Running Entry must emit neither a finish nor
    /// an error event. Re-reads `cancelled` right before `about_to_emit`
    /// would be sent, closing the window where a concurrent `cancel` flips
    /// it between the earlier read in `handle_exit` and this point.
    async fn debug_check_silent_cancellation(&self, job_id: JobId, about_to_emit: &encode_types::EncodeEvent) {
        if cfg!(debug_assertions) {
            let state = self.state.lock().await;
            if let Some(entry) = state.running.get(job_id) {
                assert!(
                    encode_queue::invariants::lifecycle::check_silent_cancellation(
                        entry,
                        Some(about_to_emit)
                    )
                    .is_ok(),
                    "LC-2 violated: job {job_id} is cancelled but a finish/error event was about to be emitted"
                );
            }
        }
    }

    /// Cleanup branch of §4.6 step 6: delete partial output after a short
    /// grace period, logging but never propagating deletion errors (I6).
    async fn cleanup_output(&self, job_id: JobId, resolution: &encode_engine::Resolution) {
        let Some(output) = &resolution.output else {
            return;
        };
        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
        if let Err(e) = self.fs_util.unlink(&output.full_path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(%job_id, error = %e, path = %output.full_path.display(), "failed to delete partial output");
            }
        }
    }

    /// LC-3: call after [`Self::cleanup_output`] has run for an abnormal
    /// exit. Only meaningful against a real filesystem, so it is a no-op
    /// when the resolution carries no output.
    fn debug_check_output_cleaned_up(&self, job_id: JobId, resolution: &encode_engine::Resolution) {
        if cfg!(debug_assertions) {
            if let Some(output) = &resolution.output {
                debug_assert!(
                    encode_queue::invariants::lifecycle::check_output_cleaned_up(
                        job_id.0,
                        &output.full_path
                    )
                    .is_ok(),
                    "LC-3 violated: job {job_id} left an orphaned output file at {}",
                    output.full_path.display()
                );
            }
        }
    }

    /// §4.5 `finalize`.
    async fn finalize(self: &Arc<Self>, job_id: JobId) {
        match self.gate.acquire_guard(priority::CLEAR_QUEUE).await {
            Ok(guard) => {
                self.debug_check_gate_order().await;
                {
                    let mut state = self.state.lock().await;
                    if let Some(mut entry) = state.running.remove(job_id) {
                        entry.clear_deadline();
                        debug_assert!(
                            encode_queue::invariants::lifecycle::check_deadline_cleared(&entry).is_ok(),
                            "LC-1 violated while finalizing job {job_id}"
                        );
                    }
                }
                guard.release().await;
            }
            Err(e) => {
                error!(%job_id, error = %e, "finalize could not acquire execution gate");
            }
        }
        self.trigger_check_queue();
    }
}
