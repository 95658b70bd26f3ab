//! Actor Message Definitions
//!
//! ```text
//! FsActor --BuildMsg--> BuildActor --WsMsg--> WsActor
//! ```

use std::net::TcpStream;
use std::path::PathBuf;

use crate::pipeline::BuildTarget;
use crate::render::TemplateKind;

/// One routed change from the watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Sources of `target` were created or modified.
    Rebuild {
        target: BuildTarget,
        paths: Vec<PathBuf>,
    },
    /// Sources of `target` were removed; their outputs go too.
    Remove {
        target: BuildTarget,
        paths: Vec<PathBuf>,
    },
    /// A page template changed; every page using it is re-rendered.
    Template(TemplateKind),
}

/// Messages to BuildActor
#[derive(Debug)]
pub enum BuildMsg {
    /// One debounced batch, applied in order.
    Apply(Vec<Change>),
    Shutdown,
}

/// Messages to WsActor
#[derive(Debug)]
pub enum WsMsg {
    /// Tell every browser to reload.
    Reload { reason: String },
    /// New TCP connection from the reload server, not yet upgraded.
    AddClient(TcpStream),
    Shutdown,
}
