//! WebSocket chat server implementation.

mod handler;
mod server;
pub mod signal;
pub mod state;

pub use server::Server;
