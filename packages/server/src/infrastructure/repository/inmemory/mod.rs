//! InMemory Repository 実装
//!
//! ドメイン層が定義する Repository trait を HashMap / Vec で実装する。

mod message;
mod room;
mod user;

pub use message::InMemoryMessageRepository;
pub use room::InMemoryRoomRepository;
pub use user::InMemoryUserRepository;
