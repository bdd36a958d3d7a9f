//! The Encode Manager (§2): the long-lived core that ties the Execution
//! Gate, Wait Queue, and Running Set (`encode-queue`) to the Process
//! Supervisor (`encode-engine`) and exposes the four Public Operations
//! (§4.7) over a pluggable set of collaborators (§6).
//!
//! [`collaborators`] carries the `tokio`-backed default implementations of
//! the collaborator traits `encode-engine` defines; a caller can supply its
//! own (a real recording metadata store, a real video file store) while
//! reusing these for the filesystem, process, and event-bus concerns this
//! crate owns outright (§4.8).

mod manager;

pub mod collaborators;

pub use manager::EncodeManager;
