//! Process-wide state shared by the server, the watcher and Ctrl+C.

mod state;

pub use state::{
    is_serving, is_shutdown, register_server, register_shutdown, set_serving,
    setup_shutdown_handler,
};
