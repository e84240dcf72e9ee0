//! JWT (HS256) によるトークン発行・検証
//!
//! クレームは `{ "user_id": string, "exp": unix seconds }`。

use std::time::Duration;

use hiroba_shared::time::get_unix_timestamp;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::domain::{AuthError, TokenValidator, UserId};

/// アクセストークンの既定の有効期間（5 時間）
pub const DEFAULT_ACCESS_TOKEN_TTL: Duration = Duration::from_secs(5 * 60 * 60);

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    user_id: String,
    exp: i64,
}

/// 共有シークレットで署名・検証する JWT 実装
pub struct JwtTokenValidator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtTokenValidator {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// `ttl` 後に失効するトークンを発行
    pub fn issue_token(&self, user_id: &UserId, ttl: Duration) -> Result<String, AuthError> {
        let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        self.issue_token_expiring_at(user_id, get_unix_timestamp().saturating_add(ttl))
    }

    /// 失効時刻（unix 秒）を指定してトークンを発行
    pub fn issue_token_expiring_at(
        &self,
        user_id: &UserId,
        expires_at: i64,
    ) -> Result<String, AuthError> {
        let claims = Claims {
            user_id: user_id.as_str().to_string(),
            exp: expires_at,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::IssueFailed(e.to_string()))
    }
}

impl TokenValidator for JwtTokenValidator {
    fn validate_token(&self, token: &str) -> Result<UserId, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;
        UserId::new(data.claims.user_id).map_err(|_| AuthError::InvalidUserId)
    }
}
