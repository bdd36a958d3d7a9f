//! Concrete, `tokio`-backed implementations of the collaborator traits
//! defined in `encode-engine` (§4.8).

mod channel_event;
mod tokio_fs;
mod tokio_process;

pub use channel_event::ChannelEventEmitter;
pub use tokio_fs::TokioFsUtil;
pub use tokio_process::TokioProcessManager;
