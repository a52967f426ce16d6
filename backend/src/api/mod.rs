//! HTTP API module.
//!
//! HTTP server, response types and the log broadcaster used by every stage.

pub mod server;
pub mod types;
pub mod logs;

pub use server::{router, serve, start_server, AppState};
pub use types::*;
pub use logs::*;
