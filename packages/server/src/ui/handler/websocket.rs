//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{Stream, StreamExt},
};
use tokio::sync::{Notify, mpsc};

use crate::{
    domain::{Author, ConnectionId, DisplayName, MessageText, PusherChannel, RoomId},
    infrastructure::dto::websocket::{
        ClientEvent, ConnectedPayload, JoinRoomPayload, SendMessagePayload, ServerEvent,
    },
    ui::state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    // The transport assigns the connection identity
    let connection_id = ConnectionId::generate();
    ws.on_upgrade(move |socket| handle_socket(socket, state, connection_id))
}

/// Serialize a server event and queue it on a client's channel.
fn reply(sender: &PusherChannel, event: &ServerEvent) {
    match serde_json::to_string(event) {
        Ok(json) => {
            if sender.send(json).is_err() {
                tracing::debug!("Reply dropped, client channel is closed");
            }
        }
        Err(e) => tracing::error!("Failed to serialize server event: {}", e),
    }
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// This function handles the outbound message flow: room broadcasts and direct replies
/// (via rx channel) are sent to this client's WebSocket connection.
///
/// # Arguments
///
/// * `rx` - Channel receiver for serialized server events
/// * `sender` - WebSocket sink to send messages to this client
///
/// # Returns
///
/// A `JoinHandle` for the spawned task
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

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, connection_id: ConnectionId) {
    // Create a channel for this client to receive messages
    let (tx, rx) = mpsc::unbounded_channel();

    // Use ConnectClientUseCase to register the connection
    if let Err(e) = state
        .connect_client_usecase
        .execute(connection_id, tx.clone())
        .await
    {
        tracing::error!("Failed to register connection '{}': {}", connection_id, e);
        return;
    }
    tracing::info!("Connection '{}' established", connection_id);

    reply(
        &tx,
        &ServerEvent::Connected(ConnectedPayload {
            connection_id: connection_id.to_string(),
        }),
    );

    let (sender, receiver) = socket.split();
    let stop = Arc::new(Notify::new());

    // Spawn a task to receive events from this client
    let mut recv_task = tokio::spawn(receive_loop(
        receiver,
        state.clone(),
        connection_id,
        tx,
        stop.clone(),
    ));

    // Spawn a task to push server events to this client
    let mut send_task = pusher_loop(rx, sender);

    let push_closed = tokio::select! {
        _ = &mut recv_task => false,
        _ = &mut send_task => true,
    };
    if push_closed {
        // The event being handled must run to completion before disconnecting
        stop.notify_one();
        if let Err(e) = recv_task.await {
            tracing::error!("Receive task for '{}' failed: {}", connection_id, e);
        }
    } else {
        send_task.abort();
    }

    // Use DisconnectClientUseCase to leave the room and deregister
    state.disconnect_client_usecase.execute(&connection_id).await;
}

/// Read client frames until the socket closes or `stop` is notified.
///
/// `stop` only interrupts the wait for the next frame; a frame that is already
/// being handled is never cancelled halfway through its use case.
async fn receive_loop<S>(
    mut receiver: S,
    state: Arc<AppState>,
    connection_id: ConnectionId,
    reply_to: PusherChannel,
    stop: Arc<Notify>,
) where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    loop {
        let msg = tokio::select! {
            msg = receiver.next() => msg,
            _ = stop.notified() => {
                tracing::debug!("Receive loop for '{}' stopped", connection_id);
                break;
            }
        };
        let msg = match msg {
            Some(Ok(msg)) => msg,
            Some(Err(e)) => {
                tracing::error!("WebSocket error on '{}': {}", connection_id, e);
                break;
            }
            None => break,
        };

        match msg {
            Message::Text(text) => {
                tracing::debug!("Received text from '{}': {}", connection_id, text.as_str());
                handle_client_frame(&state, connection_id, &reply_to, text.as_str()).await;
            }
            Message::Binary(_) => {
                tracing::warn!("Binary frame from '{}' ignored", connection_id);
                reply(&reply_to, &ServerEvent::error("binary frames are not supported"));
            }
            Message::Ping(_) => {
                tracing::debug!("Received ping");
                // Ping/pong is handled automatically by the WebSocket protocol
            }
            Message::Close(_) => {
                tracing::info!("Connection '{}' requested close", connection_id);
                break;
            }
            _ => {}
        }
    }
}

/// Parse one text frame and dispatch it to the matching use case.
///
/// Malformed frames and rejected events are answered with an `error` event
/// on this connection only.
async fn handle_client_frame(
    state: &AppState,
    connection_id: ConnectionId,
    reply_to: &PusherChannel,
    text: &str,
) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Malformed event from '{}': {}", connection_id, e);
            reply(reply_to, &ServerEvent::error(format!("malformed event: {e}")));
            return;
        }
    };

    let result = match event {
        ClientEvent::JoinRoom(payload) => join_room(state, connection_id, payload).await,
        ClientEvent::LeaveRoom => {
            state.leave_room_usecase.execute(&connection_id).await;
            Ok(())
        }
        ClientEvent::SendMessage(payload) => send_message(state, connection_id, payload).await,
    };

    if let Err(message) = result {
        tracing::warn!("Rejected event from '{}': {}", connection_id, message);
        reply(reply_to, &ServerEvent::error(message));
    }
}

async fn join_room(
    state: &AppState,
    connection_id: ConnectionId,
    payload: JoinRoomPayload,
) -> Result<(), String> {
    // Convert String -> Domain Models
    let room_id = RoomId::try_from(payload.room_id).map_err(|e| e.to_string())?;
    let display_name = DisplayName::try_from(payload.user_name).map_err(|e| e.to_string())?;

    state
        .join_room_usecase
        .execute(connection_id, room_id, display_name)
        .await
        .map(|_| ())
        .map_err(|e| e.to_string())
}

async fn send_message(
    state: &AppState,
    connection_id: ConnectionId,
    payload: SendMessagePayload,
) -> Result<(), String> {
    // Convert String -> Domain Models
    let room_id = RoomId::try_from(payload.room_id).map_err(|e| e.to_string())?;
    let text = MessageText::try_from(payload.text).map_err(|e| e.to_string())?;
    let display_name = payload
        .user_name
        .map(DisplayName::try_from)
        .transpose()
        .map_err(|e| e.to_string())?;

    state
        .send_message_usecase
        .execute(
            room_id,
            text,
            Author::from_optional(display_name),
            Some(connection_id),
        )
        .await
        .map(|_| ())
        .map_err(|e| e.to_string())
}
