//! UseCase 層のエラー型

use thiserror::Error;

/// ハンドシェイク時の拒否理由（HandshakeRejected）
///
/// `Display` の文字列はそのままクライアントへのエラーフレームとして送られる。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("Missing token")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Missing room_id")]
    MissingRoomId,

    #[error("Invalid room_id")]
    InvalidRoomId,

    #[error("Not a member of this room")]
    NotRoomMember,

    #[error("Failed to verify room membership")]
    MembershipLookupFailed,
}

/// 受信フレームの処理エラー（フレーム単位で閉じ、接続は維持される）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    #[error("failed to persist message: {0}")]
    PersistenceError(String),
}

/// メッセージ履歴取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomMessagesError {
    #[error("missing or invalid credentials")]
    Unauthorized,

    #[error("not a member of this room")]
    Forbidden,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("failed to load messages: {0}")]
    RepositoryError(String),
}
