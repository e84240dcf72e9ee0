//! メッセージ配信（通知）の抽象化
//!
//! - `MessagePusher`: ルームへのブロードキャストだけを行う能力。
//!   配信パイプラインはこれにだけ依存する。
//! - `ConnectionRegistry`: どの接続がどのルームに属し、どのユーザーが所有するかの台帳。
//!   接続ライフサイクルのユースケースが使う。

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError, MessageView, RoomId, UserId};

/// 接続の書き込みタスクに渡すフレーム
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    /// クライアントへ送るテキスト（JSON）
    Text(String),
    /// 接続を閉じる
    Close,
}

/// 1 接続の送信側
///
/// 受信側は接続ごとの書き込みタスクが所有し、ソケットへ流す。
/// 書き込みタスクが終了していれば `send` が失敗する。
pub type PusherChannel = mpsc::UnboundedSender<OutboundFrame>;

/// ブロードキャストの結果
///
/// 書き込みに失敗した接続は `pruned` に入り、その時点で台帳から削除されている。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastOutcome {
    pub delivered: usize,
    pub pruned: Vec<ConnectionId>,
}

impl BroadcastOutcome {
    pub fn is_partial_failure(&self) -> bool {
        !self.pruned.is_empty()
    }
}

/// ルームへのブロードキャスト能力
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// ルームに登録されている全接続（`exclude` を除く）へビューを配信する
    ///
    /// 一部の接続への書き込み失敗はエラーにしない。
    async fn broadcast(
        &self,
        room_id: &RoomId,
        view: &MessageView,
        exclude: Option<ConnectionId>,
    ) -> Result<BroadcastOutcome, MessagePushError>;
}

/// 接続台帳
///
/// 登録・解除・ブロードキャストは互いに排他に実行される。
#[async_trait]
pub trait ConnectionRegistry: MessagePusher {
    /// 接続をルームに登録（同じ接続の再登録は上書き）
    async fn register(
        &self,
        room_id: RoomId,
        connection_id: ConnectionId,
        user_id: UserId,
        channel: PusherChannel,
    );

    /// 接続をルームから削除し、送信側を閉じる（未登録なら何もしない）
    async fn unregister(&self, room_id: &RoomId, connection_id: ConnectionId);

    /// 接続を所有するユーザーを取得
    async fn lookup_user(&self, room_id: &RoomId, connection_id: ConnectionId) -> Option<UserId>;
}
