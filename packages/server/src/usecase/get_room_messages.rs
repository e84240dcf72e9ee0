//! UseCase: ルームのメッセージ履歴取得
//!
//! 再接続したクライアントが取りこぼしたメッセージを読み直すための API。
//! ページ 1 が最新の `limit` 件で、各ページ内は古い順に並べて返す。

use std::sync::Arc;

use crate::domain::{
    MessagePage, MessageRepository, MessageView, RoomId, RoomRepository, TokenValidator,
    UserRepository,
};

use super::{
    error::GetRoomMessagesError,
    membership::{Membership, check_membership},
    send_message::resolve_sender_view,
};

/// メッセージ履歴の 1 ページ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomMessagePage {
    pub total: u64,
    pub page: MessagePage,
    pub messages: Vec<MessageView>,
}

/// メッセージ履歴取得のユースケース
pub struct GetRoomMessagesUseCase {
    token_validator: Arc<dyn TokenValidator>,
    message_repository: Arc<dyn MessageRepository>,
    user_repository: Arc<dyn UserRepository>,
    room_repository: Arc<dyn RoomRepository>,
    enforce_room_membership: bool,
}

impl GetRoomMessagesUseCase {
    /// 新しい GetRoomMessagesUseCase を作成
    pub fn new(
        token_validator: Arc<dyn TokenValidator>,
        message_repository: Arc<dyn MessageRepository>,
        user_repository: Arc<dyn UserRepository>,
        room_repository: Arc<dyn RoomRepository>,
        enforce_room_membership: bool,
    ) -> Self {
        Self {
            token_validator,
            message_repository,
            user_repository,
            room_repository,
            enforce_room_membership,
        }
    }

    /// メッセージ履歴を取得
    ///
    /// # Arguments
    ///
    /// * `bearer_token` - `Authorization: Bearer` ヘッダのトークン
    /// * `room_id` - 対象ルーム（パスパラメータ）
    /// * `limit` / `page` - クエリパラメータ（省略時は 20 件・1 ページ目）
    pub async fn execute(
        &self,
        bearer_token: Option<&str>,
        room_id: String,
        limit: Option<u64>,
        page: Option<u64>,
    ) -> Result<RoomMessagePage, GetRoomMessagesError> {
        // 1. 認証
        let token = bearer_token.ok_or(GetRoomMessagesError::Unauthorized)?;
        let user_id = self
            .token_validator
            .validate_token(token)
            .map_err(|_| GetRoomMessagesError::Unauthorized)?;

        // 2. パラメータの検証
        let room_id =
            RoomId::new(room_id).map_err(|e| GetRoomMessagesError::InvalidRequest(e.to_string()))?;
        let page = MessagePage::new(
            limit.unwrap_or(MessagePage::DEFAULT_LIMIT),
            page.unwrap_or(1),
        )
        .map_err(|e| GetRoomMessagesError::InvalidRequest(e.to_string()))?;

        // 3. 参加資格の確認
        if self.enforce_room_membership {
            match check_membership(self.room_repository.as_ref(), &room_id, &user_id).await {
                Membership::Member => {}
                Membership::NotMember => return Err(GetRoomMessagesError::Forbidden),
                Membership::LookupFailed(e) => {
                    return Err(GetRoomMessagesError::RepositoryError(e.to_string()));
                }
            }
        }

        // 4. 取得（新しい順）→ 古い順に並べ替え
        let mut messages = self
            .message_repository
            .find_messages_by_room(&room_id, page)
            .await
            .map_err(|e| GetRoomMessagesError::RepositoryError(e.to_string()))?;
        messages.reverse();

        let total = self
            .message_repository
            .count_messages_by_room(&room_id)
            .await
            .map_err(|e| GetRoomMessagesError::RepositoryError(e.to_string()))?;

        // 5. 送信者名の解決
        let mut views = Vec::with_capacity(messages.len());
        for message in messages {
            views.push(resolve_sender_view(self.user_repository.as_ref(), message).await);
        }

        Ok(RoomMessagePage {
            total,
            page,
            messages: views,
        })
    }
}
