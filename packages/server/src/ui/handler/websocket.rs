//! WebSocket connection handlers.
//!
//! 1 接続につき、受信ループと送信タスク（`pusher_loop`）の 2 つが動く。
//! どちらかが終わればもう一方を止め、接続を台帳から外す。

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use serde::Deserialize;
use tokio::{sync::mpsc, task::AbortHandle};

use crate::{
    domain::{ConnectionId, OutboundFrame, RoomId},
    ui::state::AppState,
    usecase::{ConnectError, DisconnectParticipantUseCase},
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub token: Option<String>,
    pub room_id: Option<String>,
}

/// ハンドシェイクは常にアップグレードし、拒否する場合はエラーフレームを送ってから閉じる
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, query))
}

/// 接続の解放を保証するガード
///
/// 通常は `release` で明示的に解放する。ハンドラのタスクが途中で破棄された場合は
/// `Drop` で解放処理を spawn する。破棄時には `track` した送受信タスクも止める。
struct ConnectionGuard {
    usecase: Arc<DisconnectParticipantUseCase>,
    room_id: RoomId,
    connection_id: ConnectionId,
    tasks: Vec<AbortHandle>,
    released: bool,
}

impl ConnectionGuard {
    fn new(
        usecase: Arc<DisconnectParticipantUseCase>,
        room_id: RoomId,
        connection_id: ConnectionId,
    ) -> Self {
        Self {
            usecase,
            room_id,
            connection_id,
            tasks: Vec::new(),
            released: false,
        }
    }

    /// ガードの破棄時に止めるタスクを登録
    fn track(&mut self, task: AbortHandle) {
        self.tasks.push(task);
    }

    async fn release(mut self) {
        self.usecase
            .execute(&self.room_id, self.connection_id)
            .await;
        // 解放が完了してから立てる（待機中に破棄されたら Drop 側で解放する）
        self.released = true;
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
        if self.released {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let usecase = self.usecase.clone();
        let room_id = self.room_id.clone();
        let connection_id = self.connection_id;
        handle.spawn(async move {
            usecase.execute(&room_id, connection_id).await;
        });
    }
}

/// Spawns a task that receives frames from the rx channel and pushes them to the WebSocket sender.
///
/// 書き込みに失敗すると rx を破棄して終了する。以降の台帳からの送信は失敗し、
/// 次のブロードキャストでこの接続は除外される。
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<OutboundFrame>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            match frame {
                OutboundFrame::Text(text) => {
                    if let Err(e) = sender.send(Message::Text(text.into())).await {
                        tracing::debug!("Failed to write frame: {}", e);
                        break;
                    }
                }
                OutboundFrame::Close => {
                    if let Err(e) = sender.send(Message::Close(None)).await {
                        tracing::debug!("Failed to write close frame: {}", e);
                    }
                    break;
                }
            }
        }
    })
}

/// 拒否理由をテキストフレームで送り、接続を閉じる
async fn reject(mut socket: WebSocket, error: ConnectError) {
    if let Err(e) = socket.send(Message::Text(error.to_string().into())).await {
        tracing::debug!("Failed to send handshake error: {}", e);
        return;
    }
    if let Err(e) = socket.send(Message::Close(None)).await {
        tracing::debug!("Failed to close rejected socket: {}", e);
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, query: ConnectQuery) {
    let participant = match state
        .connect_participant_usecase
        .authenticate(query.token.as_deref(), query.room_id.as_deref())
        .await
    {
        Ok(participant) => participant,
        Err(e) => {
            tracing::warn!("Handshake rejected: {}", e);
            reject(socket, e).await;
            return;
        }
    };

    // Create a channel for this connection to receive frames
    let (tx, rx) = mpsc::unbounded_channel();
    let connection_id = state
        .connect_participant_usecase
        .execute(&participant, tx)
        .await;
    tracing::info!(
        "Connection {} of '{}' registered in room '{}'",
        connection_id,
        participant.user_id,
        participant.room_id
    );

    let mut guard = ConnectionGuard::new(
        state.disconnect_participant_usecase.clone(),
        participant.room_id.clone(),
        connection_id,
    );

    let (sender, receiver) = socket.split();

    // Spawn a task to receive chat frames from this connection
    let mut recv_task = tokio::spawn(receive_loop(
        receiver,
        state.clone(),
        participant.room_id.clone(),
        connection_id,
    ));

    // Spawn a task to push frames from the registry to this connection
    let mut send_task = pusher_loop(rx, sender);

    guard.track(recv_task.abort_handle());
    guard.track(send_task.abort_handle());

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    guard.release().await;
    tracing::info!(
        "Connection {} of '{}' left room '{}'",
        connection_id,
        participant.user_id,
        participant.room_id
    );
}

async fn receive_loop(
    mut receiver: SplitStream<WebSocket>,
    state: Arc<AppState>,
    room_id: RoomId,
    connection_id: ConnectionId,
) {
    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!("WebSocket error on connection {}: {}", connection_id, e);
                break;
            }
        };

        match msg {
            Message::Text(text) => {
                // 送信者は台帳から引く（フレームの自己申告は使わない）
                let Some(sender_id) = state
                    .connect_participant_usecase
                    .resolve_sender(&room_id, connection_id)
                    .await
                else {
                    tracing::warn!(
                        "Connection {} is no longer registered in room '{}'",
                        connection_id,
                        room_id
                    );
                    break;
                };

                match state
                    .send_message_usecase
                    .execute(&room_id, &sender_id, connection_id, text.as_str())
                    .await
                {
                    Ok(view) => tracing::debug!(
                        "Message {} from '{}' processed in room '{}'",
                        view.message.id,
                        sender_id,
                        room_id
                    ),
                    Err(e) => {
                        tracing::warn!("Dropped frame from '{}': {}", sender_id, e);
                    }
                }
            }
            Message::Binary(_) => {
                tracing::warn!("Ignoring binary frame on connection {}", connection_id);
            }
            Message::Ping(_) | Message::Pong(_) => {
                // Ping/pong is handled automatically by the WebSocket protocol
                tracing::debug!("Received ping/pong");
            }
            Message::Close(_) => {
                tracing::info!("Connection {} requested close", connection_id);
                break;
            }
        }
    }
}
