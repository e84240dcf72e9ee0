//! UseCase: 参加者切断処理
//!
//! 受信ループがどの経路で終わっても必ず呼ばれ、接続を台帳から外して送信側を閉じる。

use std::sync::Arc;

use crate::domain::{ConnectionId, ConnectionRegistry, RoomId};

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    /// 接続台帳
    registry: Arc<dyn ConnectionRegistry>,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// 参加者切断を実行（既に外れていれば何もしない）
    pub async fn execute(&self, room_id: &RoomId, connection_id: ConnectionId) {
        self.registry.unregister(room_id, connection_id).await;
    }
}
