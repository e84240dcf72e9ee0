//! Entities
//!
//! 識別子を持つドメインオブジェクト。

use super::value_object::{MessageContent, MessageId, RoomId, Timestamp, UserId};

/// 表示名を解決できなかった送信者に使うプレースホルダ
pub const UNKNOWN_USER_NAME: &str = "Unknown User";

/// 永続化されるチャットメッセージ（生成後は不変）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub room_id: RoomId,
    pub sender_id: UserId,
    pub content: MessageContent,
    pub created_at: Timestamp,
}

impl Message {
    /// 新しい識別子を採番してメッセージを作成
    pub fn new(
        room_id: RoomId,
        sender_id: UserId,
        content: MessageContent,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: MessageId::generate(),
            room_id,
            sender_id,
            content,
            created_at,
        }
    }
}

/// 配信用のメッセージ表現（送信者の表示名を付与したもの）
///
/// 配信のたびに組み立てられ、永続化はされない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub message: Message,
    pub sender_name: String,
}

impl MessageView {
    pub fn new(message: Message, sender_name: String) -> Self {
        Self {
            message,
            sender_name,
        }
    }

    /// 表示名が解決できなかった場合のビュー
    pub fn with_unknown_sender(message: Message) -> Self {
        Self::new(message, UNKNOWN_USER_NAME.to_string())
    }
}

/// ユーザー（外部の永続化層が所有）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
}

impl User {
    pub fn new(id: UserId, name: String) -> Self {
        Self { id, name }
    }
}

/// チャットルーム（外部の永続化層が所有、コアからは読み取りのみ）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRoom {
    pub id: RoomId,
    pub members: Vec<UserId>,
}

impl ChatRoom {
    pub fn new(id: RoomId, members: Vec<UserId>) -> Self {
        Self { id, members }
    }
}
