//! Conversion logic between DTOs and domain entities.

use crate::domain::MessageView;
use crate::infrastructure::{
    dto::{http::ConnectionDto, websocket as dto},
    registry::RegisteredConnection,
};

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&MessageView> for dto::MessageViewDto {
    fn from(view: &MessageView) -> Self {
        let message = &view.message;
        Self {
            id: message.id.to_string(),
            room_id: message.room_id.as_str().to_string(),
            sender_id: message.sender_id.as_str().to_string(),
            sender_name: view.sender_name.clone(),
            content: message.content.as_str().to_string(),
            created_at: message.created_at.value(),
        }
    }
}

impl From<MessageView> for dto::MessageViewDto {
    fn from(view: MessageView) -> Self {
        Self::from(&view)
    }
}

impl From<RegisteredConnection> for ConnectionDto {
    fn from(connection: RegisteredConnection) -> Self {
        Self {
            connection_id: connection.connection_id.to_string(),
            user_id: connection.user_id.into_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Message, MessageContent, RoomId, Timestamp, UserId};

    #[test]
    fn test_message_view_to_dto() {
        // テスト項目: MessageView がワイヤ形式の DTO に変換される
        // given (前提条件):
        let message = Message::new(
            RoomId::new("r1".to_string()).unwrap(),
            UserId::new("alice".to_string()).unwrap(),
            MessageContent::new("hi".to_string()).unwrap(),
            Timestamp::new(1_700_000_000),
        );
        let id = message.id.to_string();
        let view = MessageView::new(message, "Alice".to_string());

        // when (操作):
        let dto = dto::MessageViewDto::from(&view);

        // then (期待する結果):
        assert_eq!(dto.id, id);
        assert_eq!(dto.room_id, "r1");
        assert_eq!(dto.sender_id, "alice");
        assert_eq!(dto.sender_name, "Alice");
        assert_eq!(dto.content, "hi");
        assert_eq!(dto.created_at, 1_700_000_000);
    }

    #[test]
    fn test_message_view_dto_wire_shape() {
        // テスト項目: シリアライズ結果が決められたキーだけを持つ
        // given (前提条件):
        let message = Message::new(
            RoomId::new("r1".to_string()).unwrap(),
            UserId::new("alice".to_string()).unwrap(),
            MessageContent::new("hi".to_string()).unwrap(),
            Timestamp::new(42),
        );
        let view = MessageView::with_unknown_sender(message);

        // when (操作):
        let json = serde_json::to_value(dto::MessageViewDto::from(view)).unwrap();

        // then (期待する結果):
        let object = json.as_object().unwrap();
        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(
            keys,
            vec!["content", "created_at", "id", "room_id", "sender_id", "sender_name"]
        );
        assert_eq!(json["created_at"], 42);
        assert_eq!(json["sender_name"], "Unknown User");
    }
}
