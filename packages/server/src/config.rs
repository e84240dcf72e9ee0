//! サーバー設定
//!
//! コマンドライン引数（環境変数）から組み立てる設定値と、インメモリストアの初期データ。

use std::str::FromStr;

use thiserror::Error;

use crate::domain::{RoomId, UserId, ValueObjectError};

/// 既定のログレベル（`RUST_LOG` が優先される）
pub const DEFAULT_LOG_LEVEL: &str = "debug";

/// 開発用の JWT 署名鍵（本番では `HIROBA_JWT_SECRET` で上書きする）
pub const DEFAULT_JWT_SECRET: &str = "hiroba-development-secret";

/// 初期データのパースエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeedParseError {
    #[error("expected '<id>=<value>', got '{0}'")]
    MissingSeparator(String),

    #[error("display name must not be empty in '{0}'")]
    EmptyName(String),

    #[error(transparent)]
    InvalidIdentifier(#[from] ValueObjectError),
}

/// `--user ID=NAME` で登録するユーザー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSeed {
    pub id: UserId,
    pub name: String,
}

impl FromStr for UserSeed {
    type Err = SeedParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, name) = s
            .split_once('=')
            .ok_or_else(|| SeedParseError::MissingSeparator(s.to_string()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(SeedParseError::EmptyName(s.to_string()));
        }
        Ok(Self {
            id: UserId::new(id.trim().to_string())?,
            name: name.to_string(),
        })
    }
}

/// `--room ID=MEMBER,MEMBER` で登録するルーム
///
/// メンバーは空でもよい（`--room lobby=`）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSeed {
    pub id: RoomId,
    pub members: Vec<UserId>,
}

impl FromStr for RoomSeed {
    type Err = SeedParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, members) = s
            .split_once('=')
            .ok_or_else(|| SeedParseError::MissingSeparator(s.to_string()))?;
        let members = members
            .split(',')
            .map(str::trim)
            .filter(|member| !member.is_empty())
            .map(|member| UserId::new(member.to_string()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            id: RoomId::new(id.trim().to_string())?,
            members,
        })
    }
}

/// サーバーの設定値
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    /// 送信者自身の接続にも配信するか
    pub echo_to_sender: bool,
    /// ルームのメンバー以外の接続・履歴取得を拒否するか
    pub enforce_room_membership: bool,
    pub users: Vec<UserSeed>,
    pub rooms: Vec<RoomSeed>,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            echo_to_sender: true,
            enforce_room_membership: false,
            users: Vec::new(),
            rooms: Vec::new(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_seed() {
        // テスト項目: `ID=NAME` 形式のユーザー定義をパースできる
        // given (前提条件):
        let raw = "alice=Alice Liddell";

        // when (操作):
        let seed: UserSeed = raw.parse().unwrap();

        // then (期待する結果):
        assert_eq!(seed.id.as_str(), "alice");
        assert_eq!(seed.name, "Alice Liddell");
    }

    #[test]
    fn test_parse_user_seed_errors() {
        // テスト項目: 区切り文字・名前・ID の欠落はエラーになる
        // given (前提条件):
        let inputs = ["alice", "alice=", "=Alice"];

        // when (操作):
        let results: Vec<_> = inputs.iter().map(|raw| raw.parse::<UserSeed>()).collect();

        // then (期待する結果):
        assert_eq!(
            results[0],
            Err(SeedParseError::MissingSeparator("alice".to_string()))
        );
        assert_eq!(
            results[1],
            Err(SeedParseError::EmptyName("alice=".to_string()))
        );
        assert!(matches!(
            results[2],
            Err(SeedParseError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_parse_room_seed() {
        // テスト項目: `ID=MEMBER,MEMBER` 形式のルーム定義をパースできる（空白と空要素は無視）
        // given (前提条件):
        let raw = "r1=alice, bob,,";

        // when (操作):
        let seed: RoomSeed = raw.parse().unwrap();

        // then (期待する結果):
        assert_eq!(seed.id.as_str(), "r1");
        assert_eq!(
            seed.members,
            vec![
                UserId::new("alice".to_string()).unwrap(),
                UserId::new("bob".to_string()).unwrap(),
            ]
        );
    }

    #[test]
    fn test_parse_room_seed_without_members() {
        // テスト項目: メンバーなしのルーム定義も受け付ける
        // given (前提条件):
        let raw = "lobby=";

        // when (操作):
        let seed: RoomSeed = raw.parse().unwrap();

        // then (期待する結果):
        assert_eq!(seed.id.as_str(), "lobby");
        assert!(seed.members.is_empty());
    }

    #[test]
    fn test_default_config() {
        // テスト項目: 既定値は送信者にも配信し、メンバーシップ確認は行わず、ログレベルは debug
        // given (前提条件):

        // when (操作):
        let config = ServerConfig::default();

        // then (期待する結果):
        assert_eq!(config.port, 8080);
        assert!(config.echo_to_sender);
        assert!(!config.enforce_room_membership);
        assert_eq!(config.log_level, "debug");
    }
}
