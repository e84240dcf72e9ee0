//! HTTP / WebSocket handlers.

mod http;
mod websocket;

pub use http::{debug_rooms, get_room_messages, health_check};
pub use websocket::websocket_handler;
