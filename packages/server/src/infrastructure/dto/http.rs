//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

use super::websocket::MessageViewDto;

/// Query parameters for message history
#[derive(Debug, Default, Deserialize)]
pub struct MessagePageQuery {
    pub limit: Option<u64>,
    pub page: Option<u64>,
}

/// One page of a room's message history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePageDto {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub messages: Vec<MessageViewDto>,
}

/// A connection currently registered in a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionDto {
    pub connection_id: String,
    pub user_id: String,
}

/// Registered connections of one room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConnectionsDto {
    pub room_id: String,
    pub connections: Vec<ConnectionDto>,
}
