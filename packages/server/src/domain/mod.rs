//! ドメイン層
//!
//! Value Object・Entity と、ユースケースが依存するインターフェース（trait）を定義する。
//! 具体的な実装（インメモリ永続化、WebSocket 台帳、JWT 検証）は Infrastructure 層にある。

pub mod auth;
pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod repository;
pub mod value_object;

pub use auth::TokenValidator;
pub use entity::{ChatRoom, Message, MessageView, UNKNOWN_USER_NAME, User};
pub use error::{AuthError, MessagePushError, RepositoryError, ValueObjectError};
pub use message_pusher::{
    BroadcastOutcome, ConnectionRegistry, MessagePusher, OutboundFrame, PusherChannel,
};
pub use repository::{MessageRepository, RoomRepository, UserRepository};
pub use value_object::{
    ConnectionId, MAX_CONTENT_LENGTH, MessageContent, MessageId, MessagePage, RoomId, Timestamp,
    UserId,
};

#[cfg(test)]
pub use message_pusher::MockMessagePusher;
#[cfg(test)]
pub use repository::{MockMessageRepository, MockRoomRepository, MockUserRepository};
