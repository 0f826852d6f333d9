//! HTTP control API
//!
//! REST endpoints driving the playback controller, plus an SSE stream of
//! the event bus.

pub mod handlers;
pub mod server;
pub mod sse;

pub use server::{build_router, run, serve, AppContext};
