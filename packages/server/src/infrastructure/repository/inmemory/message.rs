//! InMemory Message Repository 実装
//!
//! 保存順を保ったまま `Vec` に積む。ページングは作成時刻の新しい順
//! （同時刻なら後から保存したものが新しい）。

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Message, MessagePage, MessageRepository, RepositoryError, RoomId};

/// インメモリ Message Repository 実装
#[derive(Default)]
pub struct InMemoryMessageRepository {
    messages: Mutex<Vec<Message>>,
}

impl InMemoryMessageRepository {
    /// 新しい InMemoryMessageRepository を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// ルームに保存されているメッセージを保存順に取得
    pub async fn messages_in_room(&self, room_id: &RoomId) -> Vec<Message> {
        let messages = self.messages.lock().await;
        messages
            .iter()
            .filter(|message| &message.room_id == room_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn save_message(&self, message: &Message) -> Result<(), RepositoryError> {
        let mut messages = self.messages.lock().await;
        messages.push(message.clone());
        Ok(())
    }

    async fn find_messages_by_room(
        &self,
        room_id: &RoomId,
        page: MessagePage,
    ) -> Result<Vec<Message>, RepositoryError> {
        let messages = self.messages.lock().await;

        let mut in_room: Vec<(usize, &Message)> = messages
            .iter()
            .enumerate()
            .filter(|(_, message)| &message.room_id == room_id)
            .collect();
        in_room.sort_by(|(a_index, a), (b_index, b)| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b_index.cmp(a_index))
        });

        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);

        Ok(in_room
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|(_, message)| message.clone())
            .collect())
    }

    async fn count_messages_by_room(&self, room_id: &RoomId) -> Result<u64, RepositoryError> {
        let messages = self.messages.lock().await;
        let count = messages
            .iter()
            .filter(|message| &message.room_id == room_id)
            .count();
        Ok(count as u64)
    }
}
