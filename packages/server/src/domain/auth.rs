//! 認証の抽象化
//!
//! トークンの発行・検証は外部の認証基盤の責務。
//! 配信処理は「トークン → ユーザー ID」の検証だけを必要とする。

use super::{AuthError, UserId};

/// トークン検証
pub trait TokenValidator: Send + Sync {
    /// トークンを検証し、所有ユーザーの ID を返す
    fn validate_token(&self, token: &str) -> Result<UserId, AuthError>;
}
