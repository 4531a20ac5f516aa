use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use shipyard_core::JobId;

use crate::state::AppState;
use crate::ws::manager::ChannelRegistry;
use crate::ws::protocol::{ClientRequest, ServerEvent};

/// GET /ws -- upgrades the connection to a gateway WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.registry))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with the `ChannelRegistry`.
///   2. Spawns a sender task that forwards queued messages to the sink.
///   3. Processes subscribe/unsubscribe requests on the current task.
///   4. Removes the connection from every channel on disconnect.
async fn handle_socket(socket: WebSocket, registry: Arc<ChannelRegistry>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, "WebSocket connected");

    let mut rx = registry.add(conn_id.clone()).await;

    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
            if closing {
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                handle_request(&registry, &conn_id, text.as_str()).await;
            }
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    if let Some(conn) = registry.remove(&conn_id).await {
        let connected_secs = (chrono::Utc::now() - conn.connected_at).num_seconds();
        tracing::info!(
            conn_id = %conn_id,
            connected_secs,
            channels = conn.channels.len(),
            "WebSocket disconnected",
        );
    }
    send_task.abort();
}

/// Apply one client request and answer it on the same connection.
async fn handle_request(registry: &ChannelRegistry, conn_id: &str, text: &str) {
    let request = match serde_json::from_str::<ClientRequest>(text) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!(conn_id = %conn_id, error = %e, "Malformed gateway request");
            let reply = ServerEvent::error(format!("Malformed request: {e}"));
            registry.send_to(conn_id, reply.to_message()).await;
            return;
        }
    };

    let reply = match request {
        ClientRequest::Subscribe { channel } => match JobId::parse(channel.as_str()) {
            Ok(job_id) => {
                registry.join(conn_id, job_id.channel()).await;
                tracing::debug!(conn_id = %conn_id, channel = %job_id, "Joined channel");
                ServerEvent::joined(job_id.channel())
            }
            Err(e) => ServerEvent::error(format!("Invalid channel {channel:?}: {e}")),
        },
        ClientRequest::Unsubscribe { channel } => {
            registry.leave(conn_id, &channel).await;
            tracing::debug!(conn_id = %conn_id, channel = %channel, "Left channel");
            ServerEvent::left(&channel)
        }
    };

    registry.send_to(conn_id, reply.to_message()).await;
}
