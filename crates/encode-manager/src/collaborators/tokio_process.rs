//! `tokio::process`-backed [`ProcessManager`] (§4.8 Collaborator
//! implementations).
//!
//! A single background task owns the spawned [`tokio::process::Child`] for
//! its entire lifetime, selecting between its exit and an incoming kill
//! request so that a kill can interrupt a wait in progress without
//! contending for a shared lock.

use async_trait::async_trait;
use encode_engine::{ExitOutcome, ProcessManager, SpawnSpec, SpawnedChild};
use encode_types::ProcessHandle;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioProcessManager;

#[async_trait]
impl ProcessManager for TokioProcessManager {
    async fn create(&self, spec: SpawnSpec) -> std::io::Result<SpawnedChild> {
        let mut command = tokio::process::Command::new("sh");
        command
            .arg("-c")
            .arg(&spec.cmd)
            .envs(&spec.env)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        debug!(priority = spec.priority, cmd = %spec.cmd, "spawning encoder process");
        let mut child = command.spawn()?;
        let stderr = child.stderr.take();
        let pid = child.id();

        let (kill_tx, kill_rx) = mpsc::channel(1);
        let (exit_tx, exit_rx) = oneshot::channel();

        tokio::spawn(drain_stderr(pid, stderr));
        tokio::spawn(supervise(child, kill_rx, exit_tx));

        Ok(SpawnedChild {
            handle: Arc::new(TokioProcessHandle { kill_tx }),
            exit: exit_rx,
        })
    }
}

async fn drain_stderr(pid: Option<u32>, stderr: Option<tokio::process::ChildStderr>) {
    let Some(mut stderr) = stderr else {
        return;
    };
    let mut buf = Vec::new();
    if let Err(e) = stderr.read_to_end(&mut buf).await {
        warn!(?pid, error = %e, "failed to read encoder stderr");
        return;
    }
    if !buf.is_empty() {
        debug!(?pid, stderr = %String::from_utf8_lossy(&buf), "encoder stderr");
    }
}

async fn supervise(
    mut child: tokio::process::Child,
    mut kill_rx: mpsc::Receiver<()>,
    exit_tx: oneshot::Sender<ExitOutcome>,
) {
    let outcome = loop {
        tokio::select! {
            status = child.wait() => {
                break match status {
                    Ok(status) => exit_outcome(status),
                    Err(e) => {
                        warn!(error = %e, "failed to wait on encoder process");
                        ExitOutcome { code: None, signal: None }
                    }
                };
            }
            Some(()) = kill_rx.recv() => {
                if let Err(e) = child.start_kill() {
                    warn!(error = %e, "failed to send kill signal to encoder process");
                }
            }
        }
    };
    let _ = exit_tx.send(outcome);
}

#[cfg(unix)]
fn exit_outcome(status: std::process::ExitStatus) -> ExitOutcome {
    use std::os::unix::process::ExitStatusExt;
    ExitOutcome {
        code: status.code(),
        signal: status.signal(),
    }
}

#[cfg(not(unix))]
fn exit_outcome(status: std::process::ExitStatus) -> ExitOutcome {
    ExitOutcome {
        code: status.code(),
        signal: None,
    }
}

struct TokioProcessHandle {
    kill_tx: mpsc::Sender<()>,
}

#[async_trait]
impl ProcessHandle for TokioProcessHandle {
    async fn kill(&self) {
        let _ = self.kill_tx.send(()).await;
    }
}
