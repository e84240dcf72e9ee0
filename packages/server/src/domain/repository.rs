//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! ユーザー・ルーム・メッセージの永続化はこのサーバーの外側の関心事であり、
//! ここでは配信処理が必要とする操作だけを定義する。

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::{Message, MessagePage, RepositoryError, RoomId, UserId};

/// Message Repository trait
///
/// メッセージの永続化。`save_message` が成功したメッセージは
/// プロセスが落ちても失われないことを前提とする。
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// メッセージを保存
    async fn save_message(&self, message: &Message) -> Result<(), RepositoryError>;

    /// ルームのメッセージを新しい順にページングして取得
    ///
    /// 返す `Vec` の並びは新しい順。
    async fn find_messages_by_room(
        &self,
        room_id: &RoomId,
        page: MessagePage,
    ) -> Result<Vec<Message>, RepositoryError>;

    /// ルームのメッセージ総数
    async fn count_messages_by_room(&self, room_id: &RoomId) -> Result<u64, RepositoryError>;
}

/// User Repository trait
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// ユーザーの表示名を取得
    async fn find_user_display_name(&self, user_id: &UserId) -> Result<String, RepositoryError>;
}

/// Room Repository trait
///
/// ルームの参加資格の確認にのみ使う。
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// ルームのメンバー（ユーザー ID）一覧を取得
    async fn find_room_members(&self, room_id: &RoomId) -> Result<Vec<UserId>, RepositoryError>;
}
