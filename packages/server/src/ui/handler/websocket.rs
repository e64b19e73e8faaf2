//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade, rejection::WebSocketUpgradeRejection},
    },
    response::{IntoResponse, Response},
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    config::TransportMode,
    domain::Grid,
    infrastructure::dto::websocket::ServerMessage,
    ui::state::AppState,
};

use super::http::liveness;

/// `/ws`: upgrade only
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// `/`: upgrade, or a plain liveness answer in `http` transport mode
pub async fn root_handler(
    State(state): State<Arc<AppState>>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    match ws {
        Ok(ws) => ws.on_upgrade(move |socket| handle_socket(socket, state)),
        Err(_) if state.transport == TransportMode::Http => liveness().await.into_response(),
        Err(rejection) => rejection.into_response(),
    }
}

/// Spawns a task that drains the session's outbound channel into the socket.
///
/// Every frame for this session (the `init` greeting, broadcasts, error
/// replies) goes through this one task, so they arrive in queue order.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();

    // init を積んでから登録する
    let session = match state
        .connect_session_usecase
        .execute(tx, |grid: &Grid| ServerMessage::from(grid).to_json())
        .await
    {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!("Failed to register session: {}", e);
            return;
        }
    };
    let session_id = session.id;
    tracing::info!("Session '{}' connected", session_id);

    let state_clone = state.clone();

    // Spawn a task to receive frames from this session
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on session '{}': {}", session_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!("Received from '{}': {}", session_id, text.as_str());
                    if let Err(e) = state_clone
                        .dispatcher
                        .dispatch(&session_id, text.as_str())
                        .await
                    {
                        tracing::warn!("Dropped frame from session '{}': {}", session_id, e);
                    }
                }
                Message::Binary(_) => {
                    tracing::debug!("Ignoring binary frame from '{}'", session_id);
                }
                Message::Close(_) => {
                    tracing::info!("Session '{}' requested close", session_id);
                    break;
                }
                _ => {}
            }
        }
    });

    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        result = &mut recv_task => {
            if let Err(e) = result
                && e.is_panic()
            {
                tracing::warn!("Receive task of session '{}' panicked", session_id);
            }
            send_task.abort();
        }
        _ = &mut send_task => recv_task.abort(),
    };

    state.disconnect_session_usecase.execute(&session_id).await;
}
