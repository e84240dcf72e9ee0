//! ドメイン層のエラー型

use thiserror::Error;

/// Value Object の生成エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{0} must not be empty")]
    EmptyIdentifier(&'static str),

    #[error("{kind} must be at most {max} bytes")]
    IdentifierTooLong { kind: &'static str, max: usize },

    #[error("message content must not be empty")]
    EmptyContent,

    #[error("message content is {length} characters long (max {max})")]
    ContentTooLong { length: usize, max: usize },

    #[error("{0} must be a positive integer")]
    InvalidPagination(&'static str),
}

/// 永続化層のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("user '{0}' not found")]
    UserNotFound(String),

    #[error("room '{0}' not found")]
    RoomNotFound(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

/// トークン検証のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token has expired")]
    Expired,

    #[error("invalid user_id in token")]
    InvalidUserId,

    #[error("failed to issue token: {0}")]
    IssueFailed(String),
}

/// メッセージ配信のエラー
///
/// 個々の接続への書き込み失敗はエラーにならない（その接続は登録解除される）。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("failed to serialize message: {0}")]
    Serialization(String),
}
