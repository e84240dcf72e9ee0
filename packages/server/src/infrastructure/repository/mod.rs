//! Repository 実装
//!
//! - `inmemory`: プロセス内に保持する実装（再起動で消える）

pub mod inmemory;

pub use inmemory::{InMemoryMessageRepository, InMemoryRoomRepository, InMemoryUserRepository};
