//! 認証の実装
//!
//! - `jwt`: HS256 署名の JWT による実装

pub mod jwt;

pub use jwt::{DEFAULT_ACCESS_TOKEN_TTL, JwtTokenValidator};
