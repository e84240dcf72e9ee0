//! Value Objects
//!
//! 不変で、値そのものに意味を持つドメインの型。
//! 生成時にバリデーションを行い、不正な値を持つインスタンスは作れない。

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValueObjectError;

/// メッセージ本文の最大文字数
pub const MAX_CONTENT_LENGTH: usize = 4096;

/// 識別子文字列の最大長（room_id / user_id）
pub const MAX_ID_LENGTH: usize = 128;

fn validate_identifier(kind: &'static str, value: &str) -> Result<(), ValueObjectError> {
    if value.trim().is_empty() {
        return Err(ValueObjectError::EmptyIdentifier(kind));
    }
    if value.len() > MAX_ID_LENGTH {
        return Err(ValueObjectError::IdentifierTooLong {
            kind,
            max: MAX_ID_LENGTH,
        });
    }
    Ok(())
}

macro_rules! string_identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// バリデーション付きで生成
            pub fn new(value: String) -> Result<Self, ValueObjectError> {
                validate_identifier($kind, &value)?;
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_identifier!(
    /// チャットルームの識別子（外部の永続化層が採番する不透明な文字列）
    RoomId,
    "room_id"
);

string_identifier!(
    /// ユーザーの識別子（トークンの `user_id` クレームから得られる）
    UserId,
    "user_id"
);

/// 1 本の WebSocket 接続の識別子
///
/// 接続ごとにハンドシェイク成功時に採番される。プロセス再起動で意味を失う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 永続化されたメッセージの識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// メッセージ本文
///
/// 空白のみの本文と `MAX_CONTENT_LENGTH` 文字を超える本文は受け付けない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::EmptyContent);
        }
        let length = value.chars().count();
        if length > MAX_CONTENT_LENGTH {
            return Err(ValueObjectError::ContentTooLong {
                length,
                max: MAX_CONTENT_LENGTH,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Unix タイムスタンプ（秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// メッセージ履歴のページ指定（1 始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessagePage {
    limit: u64,
    page: u64,
}

impl MessagePage {
    pub const DEFAULT_LIMIT: u64 = 20;

    pub fn new(limit: u64, page: u64) -> Result<Self, ValueObjectError> {
        if limit == 0 {
            return Err(ValueObjectError::InvalidPagination("limit"));
        }
        if page == 0 {
            return Err(ValueObjectError::InvalidPagination("page"));
        }
        Ok(Self { limit, page })
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    /// 新しい順に並べたときに読み飛ばす件数
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for MessagePage {
    fn default() -> Self {
        Self {
            limit: Self::DEFAULT_LIMIT,
            page: 1,
        }
    }
}
