//! InMemory User Repository 実装

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{RepositoryError, User, UserId, UserRepository};

/// インメモリ User Repository 実装
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    /// 新しい InMemoryUserRepository を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// ユーザーを登録済みの状態で作成
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let users = users
            .into_iter()
            .map(|user| (user.id.clone(), user))
            .collect();
        Self {
            users: Mutex::new(users),
        }
    }

    /// ユーザーを追加（同じ ID なら上書き）
    pub async fn insert(&self, user: User) {
        let mut users = self.users.lock().await;
        users.insert(user.id.clone(), user);
    }

    /// ユーザーを削除
    pub async fn remove(&self, user_id: &UserId) -> Option<User> {
        let mut users = self.users.lock().await;
        users.remove(user_id)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_user_display_name(&self, user_id: &UserId) -> Result<String, RepositoryError> {
        let users = self.users.lock().await;
        users
            .get(user_id)
            .map(|user| user.name.clone())
            .ok_or_else(|| RepositoryError::UserNotFound(user_id.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_id(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_find_user_display_name() {
        // テスト項目: 登録済みユーザーの表示名を取得できる
        // given (前提条件):
        let repo =
            InMemoryUserRepository::with_users([User::new(user_id("alice"), "Alice".to_string())]);

        // when (操作):
        let result = repo.find_user_display_name(&user_id("alice")).await;

        // then (期待する結果):
        assert_eq!(result, Ok("Alice".to_string()));
    }

    #[tokio::test]
    async fn test_find_removed_user_fails() {
        // テスト項目: 削除されたユーザーの表示名取得は UserNotFound になる
        // given (前提条件):
        let repo = InMemoryUserRepository::new();
        repo.insert(User::new(user_id("bob"), "Bob".to_string()))
            .await;
        repo.remove(&user_id("bob")).await;

        // when (操作):
        let result = repo.find_user_display_name(&user_id("bob")).await;

        // then (期待する結果):
        assert_eq!(result, Err(RepositoryError::UserNotFound("bob".to_string())));
    }
}
