//! WebSocket 接続台帳の実装
//!
//! ## 責務
//!
//! - ルーム → (接続 ID → 所有ユーザー, 送信チャンネル) の管理
//! - ルームへのブロードキャストと、書き込みに失敗した接続の即時削除
//!
//! ## 排他制御
//!
//! 台帳全体を 1 つの `Mutex` で保護し、登録・解除・ブロードキャストの間は
//! ロックを保持し続ける。送信は `UnboundedSender::send`（待ちなし）なので、
//! ロック保持中にネットワーク I/O を待つことはない。
//!
//! ソケットへの書き込みは接続ごとの書き込みタスク（UI 層の `pusher_loop`）だけが行う。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{
        BroadcastOutcome, ConnectionId, ConnectionRegistry, MessagePushError, MessagePusher,
        MessageView, OutboundFrame, PusherChannel, RoomId, UserId,
    },
    infrastructure::dto::websocket::MessageViewDto,
};

/// ルーム内の 1 接続
struct Member {
    user_id: UserId,
    channel: PusherChannel,
}

impl Member {
    fn close(self) {
        // 書き込みタスクが既に終了していれば送れないが、どちらでも接続は閉じる
        let _ = self.channel.send(OutboundFrame::Close);
    }
}

#[derive(Default)]
struct RoomTable {
    rooms: HashMap<RoomId, HashMap<ConnectionId, Member>>,
    /// 接続 → 現在登録されているルーム（1 接続は高々 1 ルームに属する）
    locations: HashMap<ConnectionId, RoomId>,
}

impl RoomTable {
    fn remove(&mut self, room_id: &RoomId, connection_id: ConnectionId) -> Option<Member> {
        let members = self.rooms.get_mut(room_id)?;
        let member = members.remove(&connection_id)?;
        if members.is_empty() {
            self.rooms.remove(room_id);
        }
        self.locations.remove(&connection_id);
        Some(member)
    }
}

/// 登録中の接続の情報（デバッグ表示用）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredConnection {
    pub connection_id: ConnectionId,
    pub user_id: UserId,
}

/// WebSocket 接続台帳
///
/// ## 使用例
///
/// ```ignore
/// let registry = Arc::new(WebSocketConnectionRegistry::new());
/// registry.register(room_id.clone(), connection_id, user_id, tx).await;
/// let outcome = registry.broadcast(&room_id, &view, None).await?;
/// ```
#[derive(Default)]
pub struct WebSocketConnectionRegistry {
    table: Mutex<RoomTable>,
}

impl WebSocketConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// ルームに登録されている接続数（ルームが無ければ 0）
    pub async fn member_count(&self, room_id: &RoomId) -> usize {
        let table = self.table.lock().await;
        table.rooms.get(room_id).map_or(0, HashMap::len)
    }

    /// 登録中の接続を 1 つ以上持つルームの一覧（ソート済み）
    pub async fn room_ids(&self) -> Vec<RoomId> {
        let table = self.table.lock().await;
        let mut room_ids: Vec<RoomId> = table.rooms.keys().cloned().collect();
        room_ids.sort();
        room_ids
    }

    /// ルームに登録されている接続の一覧（接続 ID 順）
    pub async fn members(&self, room_id: &RoomId) -> Vec<RegisteredConnection> {
        let table = self.table.lock().await;
        let mut members: Vec<RegisteredConnection> = table
            .rooms
            .get(room_id)
            .map(|members| {
                members
                    .iter()
                    .map(|(connection_id, member)| RegisteredConnection {
                        connection_id: *connection_id,
                        user_id: member.user_id.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        members.sort_by_key(|member| member.connection_id);
        members
    }
}

#[async_trait]
impl MessagePusher for WebSocketConnectionRegistry {
    async fn broadcast(
        &self,
        room_id: &RoomId,
        view: &MessageView,
        exclude: Option<ConnectionId>,
    ) -> Result<BroadcastOutcome, MessagePushError> {
        let payload = serde_json::to_string(&MessageViewDto::from(view))
            .map_err(|e| MessagePushError::Serialization(e.to_string()))?;

        let mut table = self.table.lock().await;
        let mut outcome = BroadcastOutcome::default();

        let Some(members) = table.rooms.get(room_id) else {
            tracing::debug!("Room '{}' has no connections, nothing to broadcast", room_id);
            return Ok(outcome);
        };

        for (connection_id, member) in members {
            if Some(*connection_id) == exclude {
                continue;
            }
            match member.channel.send(OutboundFrame::Text(payload.clone())) {
                Ok(()) => {
                    outcome.delivered += 1;
                    tracing::debug!(
                        "Broadcasted message {} to connection {} (user '{}')",
                        view.message.id,
                        connection_id,
                        member.user_id
                    );
                }
                Err(_) => {
                    tracing::warn!(
                        "Failed to push message to connection {} (user '{}') in room '{}', pruning",
                        connection_id,
                        member.user_id,
                        room_id
                    );
                    outcome.pruned.push(*connection_id);
                }
            }
        }

        for connection_id in &outcome.pruned {
            if let Some(member) = table.remove(room_id, *connection_id) {
                member.close();
            }
        }

        if outcome.is_partial_failure() {
            tracing::warn!(
                "Partial delivery in room '{}': {} delivered, {} pruned",
                room_id,
                outcome.delivered,
                outcome.pruned.len()
            );
        }

        Ok(outcome)
    }
}

#[async_trait]
impl ConnectionRegistry for WebSocketConnectionRegistry {
    async fn register(
        &self,
        room_id: RoomId,
        connection_id: ConnectionId,
        user_id: UserId,
        channel: PusherChannel,
    ) {
        let mut table = self.table.lock().await;

        // 別のルームに登録済みなら移動させる（古いチャンネルは閉じない）
        if let Some(previous_room) = table.locations.get(&connection_id).cloned()
            && previous_room != room_id
        {
            table.remove(&previous_room, connection_id);
            tracing::debug!(
                "Connection {} moved from room '{}' to '{}'",
                connection_id,
                previous_room,
                room_id
            );
        }

        tracing::debug!(
            "Connection {} (user '{}') registered to room '{}'",
            connection_id,
            user_id,
            room_id
        );
        table.locations.insert(connection_id, room_id.clone());
        table
            .rooms
            .entry(room_id)
            .or_default()
            .insert(connection_id, Member { user_id, channel });
    }

    async fn unregister(&self, room_id: &RoomId, connection_id: ConnectionId) {
        let mut table = self.table.lock().await;
        match table.remove(room_id, connection_id) {
            Some(member) => {
                tracing::debug!(
                    "Connection {} (user '{}') unregistered from room '{}'",
                    connection_id,
                    member.user_id,
                    room_id
                );
                member.close();
            }
            None => {
                tracing::debug!(
                    "Connection {} was not registered to room '{}', nothing to do",
                    connection_id,
                    room_id
                );
            }
        }
    }

    async fn lookup_user(&self, room_id: &RoomId, connection_id: ConnectionId) -> Option<UserId> {
        let table = self.table.lock().await;
        table
            .rooms
            .get(room_id)
            .and_then(|members| members.get(&connection_id))
            .map(|member| member.user_id.clone())
    }
}
