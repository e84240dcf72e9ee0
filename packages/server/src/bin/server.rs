//! Real-time room chat server.
//!
//! Authenticated clients join a room over WebSocket and every chat frame is
//! persisted, then broadcast to the live connections of that room.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-server -- --user alice=Alice --user bob=Bob --room r1=alice,bob
//! cargo run --bin hiroba-server -- --host 0.0.0.0 --port 3000 --enforce-room-membership
//! ```

use std::sync::Arc;

use clap::{ArgAction, Parser};
use hiroba_server::{
    config::{DEFAULT_JWT_SECRET, DEFAULT_LOG_LEVEL, RoomSeed, ServerConfig, UserSeed},
    domain::{ChatRoom, User},
    infrastructure::{
        auth::{DEFAULT_ACCESS_TOKEN_TTL, JwtTokenValidator},
        registry::WebSocketConnectionRegistry,
        repository::{InMemoryMessageRepository, InMemoryRoomRepository, InMemoryUserRepository},
    },
    ui::Server,
    usecase::{
        ConnectParticipantUseCase, DisconnectParticipantUseCase, GetRoomMessagesUseCase,
        SendMessageUseCase,
    },
};
use hiroba_shared::{
    logger::setup_logger,
    time::{SystemClock, get_unix_timestamp, timestamp_to_rfc3339},
};

#[derive(Parser, Debug)]
#[command(name = "hiroba-server")]
#[command(about = "Real-time room chat server over WebSocket", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HIROBA_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "HIROBA_PORT", default_value = "8080")]
    port: u16,

    /// Secret used to sign and verify access tokens (HS256)
    #[arg(long, env = "HIROBA_JWT_SECRET", default_value = DEFAULT_JWT_SECRET, hide_env_values = true)]
    jwt_secret: String,

    /// Deliver each message back to the connection that sent it
    #[arg(long, env = "HIROBA_ECHO_TO_SENDER", default_value_t = true, action = ArgAction::Set)]
    echo_to_sender: bool,

    /// Reject connections and history requests from users who are not room members
    #[arg(long, env = "HIROBA_ENFORCE_ROOM_MEMBERSHIP")]
    enforce_room_membership: bool,

    /// Seed a user: `ID=DISPLAY_NAME` (repeatable)
    #[arg(long = "user", value_name = "ID=NAME")]
    users: Vec<UserSeed>,

    /// Seed a room: `ID=MEMBER,MEMBER` (repeatable)
    #[arg(long = "room", value_name = "ID=MEMBERS")]
    rooms: Vec<RoomSeed>,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, env = "HIROBA_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            jwt_secret: args.jwt_secret,
            echo_to_sender: args.echo_to_sender,
            enforce_room_membership: args.enforce_room_membership,
            users: args.users,
            rooms: args.rooms,
            log_level: args.log_level,
        }
    }
}

#[tokio::main]
async fn main() {
    let config = ServerConfig::from(Args::parse());

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    if config.jwt_secret == DEFAULT_JWT_SECRET {
        tracing::warn!("Using the development JWT secret; set HIROBA_JWT_SECRET in production");
    }

    // Initialize dependencies in order:
    // 1. Repositories
    // 2. Token validator / connection registry
    // 3. UseCases
    // 4. Server

    // 1. Create Repositories (in-memory database)
    let message_repository = Arc::new(InMemoryMessageRepository::new());
    let user_repository = Arc::new(InMemoryUserRepository::with_users(
        config
            .users
            .iter()
            .map(|seed| User::new(seed.id.clone(), seed.name.clone())),
    ));
    let room_repository = Arc::new(InMemoryRoomRepository::with_rooms(
        config
            .rooms
            .iter()
            .map(|seed| ChatRoom::new(seed.id.clone(), seed.members.clone())),
    ));
    for room in &config.rooms {
        tracing::info!("Room '{}' created with {} member(s)", room.id, room.members.len());
    }

    // 2. Create token validator and connection registry
    let token_validator = Arc::new(JwtTokenValidator::new(&config.jwt_secret));
    let expires_at = get_unix_timestamp() + DEFAULT_ACCESS_TOKEN_TTL.as_secs() as i64;
    let expires_at_display =
        timestamp_to_rfc3339(expires_at).unwrap_or_else(|| expires_at.to_string());
    for user in &config.users {
        match token_validator.issue_token_expiring_at(&user.id, expires_at) {
            Ok(token) => tracing::info!(
                "Development token for '{}' (expires {}): {}",
                user.id,
                expires_at_display,
                token
            ),
            Err(e) => tracing::warn!("Failed to issue token for '{}': {}", user.id, e),
        }
    }
    let registry = Arc::new(WebSocketConnectionRegistry::new());

    // 3. Create UseCases
    let connect_participant_usecase = Arc::new(ConnectParticipantUseCase::new(
        token_validator.clone(),
        room_repository.clone(),
        registry.clone(),
        config.enforce_room_membership,
    ));
    let disconnect_participant_usecase =
        Arc::new(DisconnectParticipantUseCase::new(registry.clone()));
    let send_message_usecase = Arc::new(SendMessageUseCase::new(
        message_repository.clone(),
        user_repository.clone(),
        registry.clone(),
        Arc::new(SystemClock),
        config.echo_to_sender,
    ));
    let get_room_messages_usecase = Arc::new(GetRoomMessagesUseCase::new(
        token_validator,
        message_repository,
        user_repository,
        room_repository,
        config.enforce_room_membership,
    ));

    // 4. Create and run the server
    let server = Server::new(
        connect_participant_usecase,
        disconnect_participant_usecase,
        send_message_usecase,
        get_room_messages_usecase,
        registry,
    );
    if let Err(e) = server.run(config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
