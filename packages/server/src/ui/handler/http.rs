//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
};

use crate::{
    infrastructure::dto::{
        http::{ConnectionDto, MessagePageDto, MessagePageQuery, RoomConnectionsDto},
        websocket::MessageViewDto,
    },
    ui::state::AppState,
    usecase::GetRoomMessagesError,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// `Authorization: Bearer <token>` ヘッダからトークンを取り出す
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Get one page of a room's message history
pub async fn get_room_messages(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Query(query): Query<MessagePageQuery>,
    headers: HeaderMap,
) -> Result<Json<MessagePageDto>, StatusCode> {
    match state
        .get_room_messages_usecase
        .execute(bearer_token(&headers), room_id, query.limit, query.page)
        .await
    {
        Ok(result) => {
            // Domain Model から DTO への変換
            Ok(Json(MessagePageDto {
                total: result.total,
                page: result.page.page(),
                limit: result.page.limit(),
                messages: result
                    .messages
                    .into_iter()
                    .map(MessageViewDto::from)
                    .collect(),
            }))
        }
        Err(GetRoomMessagesError::Unauthorized) => Err(StatusCode::UNAUTHORIZED),
        Err(GetRoomMessagesError::Forbidden) => Err(StatusCode::FORBIDDEN),
        Err(GetRoomMessagesError::InvalidRequest(reason)) => {
            tracing::debug!("Rejected history request: {}", reason);
            Err(StatusCode::BAD_REQUEST)
        }
        Err(GetRoomMessagesError::RepositoryError(reason)) => {
            tracing::error!("Failed to load message history: {}", reason);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Debug endpoint listing the connections currently registered per room
pub async fn debug_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomConnectionsDto>> {
    let mut rooms = Vec::new();
    for room_id in state.registry.room_ids().await {
        let connections = state
            .registry
            .members(&room_id)
            .await
            .into_iter()
            .map(ConnectionDto::from)
            .collect();
        rooms.push(RoomConnectionsDto {
            room_id: room_id.into_string(),
            connections,
        });
    }
    Json(rooms)
}
