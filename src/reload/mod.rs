//! Live reload for `serve`.
//!
//! ```text
//! BuildActor --Reload--> WsActor --text frame--> livereload.js --location.reload()
//!                           ^
//! server (acceptor) --AddClient
//! ```

pub mod message;
pub mod server;
