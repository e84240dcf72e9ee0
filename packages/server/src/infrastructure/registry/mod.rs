//! 接続台帳の実装
//!
//! - `websocket`: WebSocket 接続ごとの送信チャンネルを束ねる実装

pub mod websocket;

pub use websocket::{RegisteredConnection, WebSocketConnectionRegistry};
