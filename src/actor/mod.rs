//! Watch-mode actors.
//!
//! ```text
//! FsActor ──BuildMsg──► BuildActor ──WsMsg──► WsActor ──► browsers
//! (notify)              (pipeline)            (tungstenite)
//! ```
//!
//! Each actor owns its state and talks to the next one over a tokio mpsc
//! channel. [`Coordinator`] wires them up and stops them on Ctrl+C.

pub mod builder;
pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod ws;

pub use coordinator::Coordinator;
