//! WebSocket broadcast frame DTOs.

use serde::{Deserialize, Serialize};

/// Broadcast representation of a persisted message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageViewDto {
    pub id: String,
    pub room_id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub content: String,
    /// Unix timestamp (seconds)
    pub created_at: i64,
}
