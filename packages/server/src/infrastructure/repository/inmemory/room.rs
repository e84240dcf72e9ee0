//! InMemory Room Repository 実装
//!
//! ルームのメンバー一覧だけを保持する。ルームの作成・更新は外部の責務。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ChatRoom, RepositoryError, RoomId, RoomRepository, UserId};

/// インメモリ Room Repository 実装
#[derive(Default)]
pub struct InMemoryRoomRepository {
    rooms: Mutex<HashMap<RoomId, ChatRoom>>,
}

impl InMemoryRoomRepository {
    /// 新しい InMemoryRoomRepository を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// ルームを登録済みの状態で作成
    pub fn with_rooms(rooms: impl IntoIterator<Item = ChatRoom>) -> Self {
        let rooms = rooms
            .into_iter()
            .map(|room| (room.id.clone(), room))
            .collect();
        Self {
            rooms: Mutex::new(rooms),
        }
    }

    /// ルームを追加（同じ ID なら上書き）
    pub async fn insert(&self, room: ChatRoom) {
        let mut rooms = self.rooms.lock().await;
        rooms.insert(room.id.clone(), room);
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn find_room_members(&self, room_id: &RoomId) -> Result<Vec<UserId>, RepositoryError> {
        let rooms = self.rooms.lock().await;
        rooms
            .get(room_id)
            .map(|room| room.members.clone())
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.as_str().to_string()))
    }
}
