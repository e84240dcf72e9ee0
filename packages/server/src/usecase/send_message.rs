//! UseCase: メッセージ送信処理（配信パイプライン）
//!
//! 受信フレーム → 解析 → 永続化 → 送信者名の解決 → ブロードキャスト。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 永続化に成功したメッセージだけが配信されること（保存 → 配信の順序）
//! - 送信者名の解決に失敗しても本文の配信は止まらないこと
//! - 不正なフレームは永続化も配信もされないこと
//!
//! ### どのような状況を想定しているか
//! - 正常系：保存とブロードキャスト、送信者自身への配信有無
//! - 異常系：不正な JSON、content 欠落、空の本文、保存失敗
//! - エッジケース：送信者名の解決失敗、ブロードキャスト自体の失敗

use std::sync::Arc;

use hiroba_shared::time::Clock;
use serde::Deserialize;

use crate::domain::{
    ConnectionId, Message, MessageContent, MessagePusher, MessageRepository, MessageView, RoomId,
    Timestamp, UserId, UserRepository,
};

use super::error::SendMessageError;

/// 送信者の表示名を解決する（失敗時はプレースホルダ）
pub(crate) async fn resolve_sender_view(
    user_repository: &dyn UserRepository,
    message: Message,
) -> MessageView {
    match user_repository
        .find_user_display_name(&message.sender_id)
        .await
    {
        Ok(name) => MessageView::new(message, name),
        Err(e) => {
            tracing::warn!(
                "Failed to resolve display name of '{}', using placeholder: {}",
                message.sender_id,
                e
            );
            MessageView::with_unknown_sender(message)
        }
    }
}

/// クライアントが送るチャットフレーム: `{ "content": "..." }`（未知のフィールドは無視）
#[derive(Debug, Deserialize)]
struct InboundChatFrame {
    content: String,
}

/// 受信フレームを解析して本文を取り出す
fn parse_frame(raw_payload: &str) -> Result<MessageContent, SendMessageError> {
    let frame: InboundChatFrame = serde_json::from_str(raw_payload)
        .map_err(|e| SendMessageError::MalformedFrame(e.to_string()))?;
    MessageContent::new(frame.content).map_err(|e| SendMessageError::MalformedFrame(e.to_string()))
}

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// MessageRepository（メッセージの永続化）
    message_repository: Arc<dyn MessageRepository>,
    /// UserRepository（送信者名の解決）
    user_repository: Arc<dyn UserRepository>,
    /// MessagePusher（ブロードキャストの抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
    /// 送信者自身の接続にも配信するか
    echo_to_sender: bool,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(
        message_repository: Arc<dyn MessageRepository>,
        user_repository: Arc<dyn UserRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
        echo_to_sender: bool,
    ) -> Self {
        Self {
            message_repository,
            user_repository,
            message_pusher,
            clock,
            echo_to_sender,
        }
    }

    /// 受信フレームを処理してルームに配信する
    ///
    /// # Arguments
    ///
    /// * `room_id` - 接続が登録されているルーム
    /// * `sender_id` - 接続を所有するユーザー
    /// * `origin` - フレームを受信した接続（送信者自身への配信を止める場合に使う）
    /// * `raw_payload` - 受信したテキストフレーム
    ///
    /// # Returns
    ///
    /// * `Ok(MessageView)` - 永続化済みのメッセージ（配信は部分失敗していてもよい）
    /// * `Err(SendMessageError)` - フレームを破棄した（接続は維持する）
    pub async fn execute(
        &self,
        room_id: &RoomId,
        sender_id: &UserId,
        origin: ConnectionId,
        raw_payload: &str,
    ) -> Result<MessageView, SendMessageError> {
        // 1. フレームの解析
        let content = parse_frame(raw_payload)?;

        // 2. メッセージの生成
        let message = Message::new(
            room_id.clone(),
            sender_id.clone(),
            content,
            Timestamp::new(self.clock.now_unix_seconds()),
        );

        // 3. 永続化（失敗したら配信しない）
        self.message_repository
            .save_message(&message)
            .await
            .map_err(|e| SendMessageError::PersistenceError(e.to_string()))?;

        // 4. 送信者名の解決
        let view = resolve_sender_view(self.user_repository.as_ref(), message).await;

        // 5. ブロードキャスト
        let exclude = (!self.echo_to_sender).then_some(origin);
        match self.message_pusher.broadcast(room_id, &view, exclude).await {
            Ok(outcome) => {
                tracing::info!(
                    "Message {} from '{}' delivered to {} connection(s) in room '{}'",
                    view.message.id,
                    sender_id,
                    outcome.delivered,
                    room_id
                );
            }
            Err(e) => {
                tracing::error!(
                    "Failed to broadcast persisted message {} in room '{}': {}",
                    view.message.id,
                    room_id,
                    e
                );
            }
        }

        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        BroadcastOutcome, MessagePushError, MockMessagePusher, MockMessageRepository,
        MockUserRepository, RepositoryError, UNKNOWN_USER_NAME,
    };
    use hiroba_shared::time::FixedClock;
    use mockall::{Sequence, predicate::eq};

    const NOW: i64 = 1_700_000_000;

    fn room() -> RoomId {
        RoomId::new("r1".to_string()).unwrap()
    }

    fn alice() -> UserId {
        UserId::new("alice".to_string()).unwrap()
    }

    fn create_usecase(
        messages: MockMessageRepository,
        users: MockUserRepository,
        pusher: MockMessagePusher,
        echo_to_sender: bool,
    ) -> SendMessageUseCase {
        SendMessageUseCase::new(
            Arc::new(messages),
            Arc::new(users),
            Arc::new(pusher),
            Arc::new(FixedClock::new(NOW)),
            echo_to_sender,
        )
    }

    fn users_returning(name: &'static str) -> MockUserRepository {
        let mut users = MockUserRepository::new();
        users
            .expect_find_user_display_name()
            .returning(move |_| Ok(name.to_string()));
        users
    }

    #[tokio::test]
    async fn test_send_message_persists_then_broadcasts() {
        // テスト項目: 保存が完了してからブロードキャストされる
        // given (前提条件):
        let mut seq = Sequence::new();
        let mut messages = MockMessageRepository::new();
        messages
            .expect_save_message()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|message| {
                message.content.as_str() == "hi"
                    && message.room_id.as_str() == "r1"
                    && message.sender_id.as_str() == "alice"
                    && message.created_at.value() == NOW
            })
            .returning(|_| Ok(()));
        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_broadcast()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|room_id, view, exclude| {
                room_id.as_str() == "r1"
                    && view.message.content.as_str() == "hi"
                    && view.sender_name == "Alice"
                    && exclude.is_none()
            })
            .returning(|_, _, _| {
                Ok(BroadcastOutcome {
                    delivered: 2,
                    pruned: vec![],
                })
            });
        let usecase = create_usecase(messages, users_returning("Alice"), pusher, true);

        // when (操作):
        let result = usecase
            .execute(&room(), &alice(), ConnectionId::generate(), r#"{"content":"hi"}"#)
            .await;

        // then (期待する結果):
        let view = result.unwrap();
        assert_eq!(view.sender_name, "Alice");
        assert_eq!(view.message.created_at.value(), NOW);
    }

    #[tokio::test]
    async fn test_send_message_excludes_origin_when_echo_disabled() {
        // テスト項目: 送信者への配信を止める設定では、受信した接続が除外される
        // given (前提条件):
        let origin = ConnectionId::generate();
        let mut messages = MockMessageRepository::new();
        messages.expect_save_message().returning(|_| Ok(()));
        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_broadcast()
            .times(1)
            .withf(move |_, _, exclude| *exclude == Some(origin))
            .returning(|_, _, _| Ok(BroadcastOutcome::default()));
        let usecase = create_usecase(messages, users_returning("Alice"), pusher, false);

        // when (操作):
        let result = usecase
            .execute(&room(), &alice(), origin, r#"{"content":"hi"}"#)
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_send_message_persistence_failure_never_broadcasts() {
        // テスト項目: 保存に失敗した場合はブロードキャストされない
        // given (前提条件):
        let mut messages = MockMessageRepository::new();
        messages
            .expect_save_message()
            .times(1)
            .returning(|_| Err(RepositoryError::Storage("disk full".to_string())));
        let mut users = MockUserRepository::new();
        users.expect_find_user_display_name().never();
        let mut pusher = MockMessagePusher::new();
        pusher.expect_broadcast().never();
        let usecase = create_usecase(messages, users, pusher, true);

        // when (操作):
        let result = usecase
            .execute(&room(), &alice(), ConnectionId::generate(), r#"{"content":"hi"}"#)
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(SendMessageError::PersistenceError(_))));
    }

    #[tokio::test]
    async fn test_send_message_name_resolution_failure_uses_placeholder() {
        // テスト項目: 送信者名の解決に失敗してもプレースホルダ名で配信される
        // given (前提条件):
        let mut messages = MockMessageRepository::new();
        messages.expect_save_message().returning(|_| Ok(()));
        let mut users = MockUserRepository::new();
        users
            .expect_find_user_display_name()
            .with(eq(alice()))
            .returning(|id| Err(RepositoryError::UserNotFound(id.as_str().to_string())));
        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_broadcast()
            .times(1)
            .withf(|_, view, _| {
                view.sender_name == UNKNOWN_USER_NAME && view.message.content.as_str() == "hi"
            })
            .returning(|_, _, _| Ok(BroadcastOutcome::default()));
        let usecase = create_usecase(messages, users, pusher, true);

        // when (操作):
        let result = usecase
            .execute(&room(), &alice(), ConnectionId::generate(), r#"{"content":"hi"}"#)
            .await;

        // then (期待する結果):
        assert_eq!(result.unwrap().sender_name, UNKNOWN_USER_NAME);
    }

    #[test]
    fn test_parse_frame_ignores_unknown_fields() {
        // テスト項目: content 以外のフィールドは無視され、自己申告の送信者は使われない
        // given (前提条件):
        let raw = r#"{"content":"hi","sender_id":"mallory","type":"chat"}"#;

        // when (操作):
        let content = parse_frame(raw).unwrap();

        // then (期待する結果):
        assert_eq!(content.as_str(), "hi");
    }

    #[tokio::test]
    async fn test_send_message_malformed_frames_are_dropped() {
        // テスト項目: 解析できないフレームは保存も配信もされない
        // given (前提条件):
        let mut messages = MockMessageRepository::new();
        messages.expect_save_message().never();
        let mut pusher = MockMessagePusher::new();
        pusher.expect_broadcast().never();
        let usecase = create_usecase(messages, MockUserRepository::new(), pusher, true);

        // when (操作):
        let not_json = usecase
            .execute(&room(), &alice(), ConnectionId::generate(), "hello")
            .await;
        let missing_content = usecase
            .execute(&room(), &alice(), ConnectionId::generate(), r#"{"text":"hi"}"#)
            .await;
        let wrong_type = usecase
            .execute(&room(), &alice(), ConnectionId::generate(), r#"{"content":42}"#)
            .await;
        let blank = usecase
            .execute(&room(), &alice(), ConnectionId::generate(), r#"{"content":"  "}"#)
            .await;

        // then (期待する結果):
        for result in [not_json, missing_content, wrong_type, blank] {
            assert!(matches!(result, Err(SendMessageError::MalformedFrame(_))));
        }
    }

    #[tokio::test]
    async fn test_send_message_broadcast_error_still_returns_persisted_view() {
        // テスト項目: ブロードキャスト自体が失敗しても、永続化済みのメッセージは返される
        // given (前提条件):
        let mut messages = MockMessageRepository::new();
        messages.expect_save_message().times(1).returning(|_| Ok(()));
        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_broadcast()
            .returning(|_, _, _| Err(MessagePushError::Serialization("boom".to_string())));
        let usecase = create_usecase(messages, users_returning("Alice"), pusher, true);

        // when (操作):
        let result = usecase
            .execute(&room(), &alice(), ConnectionId::generate(), r#"{"content":"hi"}"#)
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
    }
}
