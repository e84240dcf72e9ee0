//! Server state shared by all handlers.

use std::sync::Arc;

use crate::{
    infrastructure::registry::WebSocketConnectionRegistry,
    usecase::{
        ConnectParticipantUseCase, DisconnectParticipantUseCase, GetRoomMessagesUseCase,
        SendMessageUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// ConnectParticipantUseCase（参加者接続のユースケース）
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    /// DisconnectParticipantUseCase（参加者切断のユースケース）
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// GetRoomMessagesUseCase（メッセージ履歴取得のユースケース）
    pub get_room_messages_usecase: Arc<GetRoomMessagesUseCase>,
    /// 接続台帳（デバッグ表示用）
    pub registry: Arc<WebSocketConnectionRegistry>,
}
