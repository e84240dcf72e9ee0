//! UseCase: 参加者接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::authenticate()（ハンドシェイクの検証）
//! - ConnectParticipantUseCase::execute()（接続台帳への登録）
//!
//! ### なぜこのテストが必要か
//! - トークン・room_id の欠落や不正は、台帳に何も登録せずに拒否しなければならない
//! - 登録後は受信フレームの送信者を台帳から引けなければならない
//!
//! ### どのような状況を想定しているか
//! - 正常系：有効なトークンと room_id
//! - 異常系：トークン欠落、不正なトークン、room_id 欠落、メンバー外
//! - エッジケース：メンバーシップ確認の無効化、メンバー一覧取得の失敗

use std::sync::Arc;

use crate::domain::{
    ConnectionId, ConnectionRegistry, PusherChannel, RoomId, RoomRepository, TokenValidator,
    UserId,
};

use super::{
    error::ConnectError,
    membership::{Membership, check_membership},
};

/// ハンドシェイクを通過した参加者
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedParticipant {
    pub user_id: UserId,
    pub room_id: RoomId,
}

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    /// トークン検証（認証基盤の抽象化）
    token_validator: Arc<dyn TokenValidator>,
    /// RoomRepository（参加資格の確認）
    room_repository: Arc<dyn RoomRepository>,
    /// 接続台帳
    registry: Arc<dyn ConnectionRegistry>,
    /// ルームのメンバー以外の接続を拒否するか
    enforce_room_membership: bool,
}

impl ConnectParticipantUseCase {
    /// 新しい ConnectParticipantUseCase を作成
    pub fn new(
        token_validator: Arc<dyn TokenValidator>,
        room_repository: Arc<dyn RoomRepository>,
        registry: Arc<dyn ConnectionRegistry>,
        enforce_room_membership: bool,
    ) -> Self {
        Self {
            token_validator,
            room_repository,
            registry,
            enforce_room_membership,
        }
    }

    /// ハンドシェイク時の資格情報を検証
    ///
    /// 検証順はトークンの有無 → トークンの正当性 → room_id の有無 → 参加資格。
    ///
    /// # Arguments
    ///
    /// * `token` - クエリパラメータ `token`
    /// * `room_id` - クエリパラメータ `room_id`
    ///
    /// # Returns
    ///
    /// * `Ok(AuthenticatedParticipant)` - 検証成功
    /// * `Err(ConnectError)` - 拒否（クライアントにはエラーメッセージを送って切断する）
    pub async fn authenticate(
        &self,
        token: Option<&str>,
        room_id: Option<&str>,
    ) -> Result<AuthenticatedParticipant, ConnectError> {
        // 1. トークンの検証
        let token = token
            .filter(|token| !token.is_empty())
            .ok_or(ConnectError::MissingToken)?;
        let user_id = self.token_validator.validate_token(token).map_err(|e| {
            tracing::warn!("Rejected handshake with invalid token: {}", e);
            ConnectError::InvalidToken
        })?;

        // 2. room_id の検証
        let room_id = room_id
            .filter(|room_id| !room_id.is_empty())
            .ok_or(ConnectError::MissingRoomId)?;
        let room_id =
            RoomId::new(room_id.to_string()).map_err(|_| ConnectError::InvalidRoomId)?;

        // 3. 参加資格の確認
        if self.enforce_room_membership {
            match check_membership(self.room_repository.as_ref(), &room_id, &user_id).await {
                Membership::Member => {}
                Membership::NotMember => return Err(ConnectError::NotRoomMember),
                Membership::LookupFailed(e) => {
                    tracing::error!(
                        "Failed to load members of room '{}' for '{}': {}",
                        room_id,
                        user_id,
                        e
                    );
                    return Err(ConnectError::MembershipLookupFailed);
                }
            }
        }

        Ok(AuthenticatedParticipant { user_id, room_id })
    }

    /// 参加者の接続を台帳に登録
    ///
    /// 登録は失敗しない。採番した接続 ID を返す。
    pub async fn execute(
        &self,
        participant: &AuthenticatedParticipant,
        sender: PusherChannel,
    ) -> ConnectionId {
        let connection_id = ConnectionId::generate();
        self.registry
            .register(
                participant.room_id.clone(),
                connection_id,
                participant.user_id.clone(),
                sender,
            )
            .await;
        connection_id
    }

    /// 受信フレームの送信者を台帳から取得
    pub async fn resolve_sender(
        &self,
        room_id: &RoomId,
        connection_id: ConnectionId,
    ) -> Option<UserId> {
        self.registry.lookup_user(room_id, connection_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MockRoomRepository, RepositoryError},
        infrastructure::{auth::JwtTokenValidator, registry::WebSocketConnectionRegistry},
    };
    use tokio::sync::mpsc;

    const SECRET: &str = "test-secret";

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    fn token_for(id: &str) -> String {
        JwtTokenValidator::new(SECRET)
            .issue_token(&user(id), std::time::Duration::from_secs(60))
            .unwrap()
    }

    fn create_usecase(
        room_repository: MockRoomRepository,
        enforce_room_membership: bool,
    ) -> (ConnectParticipantUseCase, Arc<WebSocketConnectionRegistry>) {
        let registry = Arc::new(WebSocketConnectionRegistry::new());
        let usecase = ConnectParticipantUseCase::new(
            Arc::new(JwtTokenValidator::new(SECRET)),
            Arc::new(room_repository),
            registry.clone(),
            enforce_room_membership,
        );
        (usecase, registry)
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        // テスト項目: 有効なトークンと room_id で認証に成功する
        // given (前提条件):
        let (usecase, _registry) = create_usecase(MockRoomRepository::new(), false);
        let token = token_for("alice");

        // when (操作):
        let result = usecase.authenticate(Some(&token), Some("r1")).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Ok(AuthenticatedParticipant {
                user_id: user("alice"),
                room_id: RoomId::new("r1".to_string()).unwrap(),
            })
        );
    }

    #[tokio::test]
    async fn test_authenticate_missing_token() {
        // テスト項目: トークンが無い（または空）の場合は MissingToken で拒否される
        // given (前提条件):
        let (usecase, _registry) = create_usecase(MockRoomRepository::new(), false);

        // when (操作):
        let absent = usecase.authenticate(None, Some("r1")).await;
        let empty = usecase.authenticate(Some(""), Some("r1")).await;

        // then (期待する結果):
        assert_eq!(absent, Err(ConnectError::MissingToken));
        assert_eq!(empty, Err(ConnectError::MissingToken));
    }

    #[tokio::test]
    async fn test_authenticate_invalid_token() {
        // テスト項目: 不正なトークンは InvalidToken で拒否される
        // given (前提条件):
        let (usecase, _registry) = create_usecase(MockRoomRepository::new(), false);
        let foreign = JwtTokenValidator::new("another-secret")
            .issue_token(&user("alice"), std::time::Duration::from_secs(60))
            .unwrap();

        // when (操作):
        let garbage = usecase.authenticate(Some("garbage"), Some("r1")).await;
        let wrong_key = usecase.authenticate(Some(&foreign), Some("r1")).await;

        // then (期待する結果):
        assert_eq!(garbage, Err(ConnectError::InvalidToken));
        assert_eq!(wrong_key, Err(ConnectError::InvalidToken));
    }

    #[tokio::test]
    async fn test_authenticate_missing_room_id() {
        // テスト項目: room_id が無い場合は MissingRoomId で拒否される
        // given (前提条件):
        let (usecase, _registry) = create_usecase(MockRoomRepository::new(), false);
        let token = token_for("alice");

        // when (操作):
        let result = usecase.authenticate(Some(&token), None).await;

        // then (期待する結果):
        assert_eq!(result, Err(ConnectError::MissingRoomId));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_non_member_when_enforced() {
        // テスト項目: メンバーシップ確認が有効な場合、メンバー以外は拒否される
        // given (前提条件):
        let mut rooms = MockRoomRepository::new();
        rooms
            .expect_find_room_members()
            .returning(|_| Ok(vec![UserId::new("bob".to_string()).unwrap()]));
        let (usecase, _registry) = create_usecase(rooms, true);
        let token = token_for("alice");

        // when (操作):
        let result = usecase.authenticate(Some(&token), Some("r1")).await;

        // then (期待する結果):
        assert_eq!(result, Err(ConnectError::NotRoomMember));
    }

    #[tokio::test]
    async fn test_authenticate_membership_lookup_failure() {
        // テスト項目: メンバー一覧の取得に失敗した場合は拒否される
        // given (前提条件):
        let mut rooms = MockRoomRepository::new();
        rooms
            .expect_find_room_members()
            .returning(|_| Err(RepositoryError::Storage("down".to_string())));
        let (usecase, _registry) = create_usecase(rooms, true);
        let token = token_for("alice");

        // when (操作):
        let result = usecase.authenticate(Some(&token), Some("r1")).await;

        // then (期待する結果):
        assert_eq!(result, Err(ConnectError::MembershipLookupFailed));
    }

    #[tokio::test]
    async fn test_authenticate_skips_membership_when_not_enforced() {
        // テスト項目: メンバーシップ確認が無効な場合、RoomRepository は呼ばれない
        // given (前提条件):
        let mut rooms = MockRoomRepository::new();
        rooms.expect_find_room_members().never();
        let (usecase, _registry) = create_usecase(rooms, false);
        let token = token_for("alice");

        // when (操作):
        let result = usecase.authenticate(Some(&token), Some("r1")).await;

        // then (期待する結果):
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_execute_registers_connection() {
        // テスト項目: 登録後、接続 ID から送信者を引ける
        // given (前提条件):
        let (usecase, registry) = create_usecase(MockRoomRepository::new(), false);
        let participant = AuthenticatedParticipant {
            user_id: user("alice"),
            room_id: RoomId::new("r1".to_string()).unwrap(),
        };
        let (tx, _rx) = mpsc::unbounded_channel();

        // when (操作):
        let connection_id = usecase.execute(&participant, tx).await;

        // then (期待する結果):
        assert_eq!(registry.member_count(&participant.room_id).await, 1);
        assert_eq!(
            usecase
                .resolve_sender(&participant.room_id, connection_id)
                .await,
            Some(user("alice"))
        );
    }
}
