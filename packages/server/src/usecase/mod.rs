//! UseCase 層
//!
//! ハンドシェイク、メッセージ配信、切断、履歴取得の各ユースケースを定義する。

pub mod connect_participant;
pub mod disconnect_participant;
pub mod error;
pub mod get_room_messages;
mod membership;
pub mod send_message;

pub use connect_participant::{AuthenticatedParticipant, ConnectParticipantUseCase};
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{ConnectError, GetRoomMessagesError, SendMessageError};
pub use get_room_messages::{GetRoomMessagesUseCase, RoomMessagePage};
pub use send_message::SendMessageUseCase;
