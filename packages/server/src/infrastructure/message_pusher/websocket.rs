//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの `UnboundedSender` を管理
//! - ルームごとのブロードキャストチャンネル（購読者の集合）を管理
//! - ドメインの通知を `ServerEvent` の JSON に変換して送信
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、メッセージ送信に使用します。

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{ConnectionId, MessagePushError, MessagePusher, Notification, PusherChannel, RoomId},
    infrastructure::dto::websocket::ServerEvent,
};

#[derive(Default)]
struct PusherState {
    /// Key: 接続 ID, Value: WebSocket sender
    clients: HashMap<ConnectionId, PusherChannel>,
    /// Key: ルーム ID, Value: 購読中の接続 ID
    channels: HashMap<RoomId, BTreeSet<ConnectionId>>,
}

/// WebSocket を使った MessagePusher 実装
///
/// ## 使用例
///
/// ```ignore
/// let pusher = WebSocketMessagePusher::new();
/// pusher.register_client(connection_id, tx).await;
/// pusher.subscribe(&connection_id, &room_id).await;
/// pusher.broadcast_to_room(&room_id, &notification, None).await?;
/// ```
#[derive(Default)]
pub struct WebSocketMessagePusher {
    state: Mutex<PusherState>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self::default()
    }

    /// ルームの購読者数（購読チャンネルが無ければ 0）
    pub async fn subscriber_count(&self, room_id: &RoomId) -> usize {
        let state = self.state.lock().await;
        state.channels.get(room_id).map_or(0, BTreeSet::len)
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut state = self.state.lock().await;
        state.clients.insert(connection_id, sender);
        tracing::debug!("Client '{}' registered to MessagePusher", connection_id);
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) {
        let mut state = self.state.lock().await;
        state.clients.remove(connection_id);
        state.channels.retain(|_, subscribers| {
            subscribers.remove(connection_id);
            !subscribers.is_empty()
        });
        tracing::debug!("Client '{}' unregistered from MessagePusher", connection_id);
    }

    async fn subscribe(&self, connection_id: &ConnectionId, room_id: &RoomId) {
        let mut state = self.state.lock().await;
        state
            .channels
            .entry(room_id.clone())
            .or_default()
            .insert(*connection_id);
        tracing::debug!("Client '{}' subscribed to room '{}'", connection_id, room_id);
    }

    async fn unsubscribe(&self, connection_id: &ConnectionId, room_id: &RoomId) {
        let mut state = self.state.lock().await;
        let now_empty = match state.channels.get_mut(room_id) {
            Some(subscribers) => {
                subscribers.remove(connection_id);
                subscribers.is_empty()
            }
            None => false,
        };
        if now_empty {
            state.channels.remove(room_id);
        }
        tracing::debug!(
            "Client '{}' unsubscribed from room '{}'",
            connection_id,
            room_id
        );
    }

    async fn broadcast_to_room(
        &self,
        room_id: &RoomId,
        notification: &Notification,
        exclude: Option<ConnectionId>,
    ) -> Result<Vec<ConnectionId>, MessagePushError> {
        let content = serde_json::to_string(&ServerEvent::from(notification))
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;

        let state = self.state.lock().await;
        let Some(subscribers) = state.channels.get(room_id) else {
            tracing::debug!("Room '{}' has no subscribers, skipping broadcast", room_id);
            return Ok(Vec::new());
        };

        let mut delivered = Vec::with_capacity(subscribers.len());
        for target in subscribers.iter().filter(|id| Some(**id) != exclude) {
            match state.clients.get(target) {
                // ブロードキャストでは一部の送信失敗を許容
                Some(sender) => match sender.send(content.clone()) {
                    Ok(()) => delivered.push(*target),
                    Err(e) => {
                        tracing::warn!("Failed to push message to client '{}': {}", target, e)
                    }
                },
                None => {
                    tracing::warn!(
                        "Client '{}' not found during broadcast, skipping",
                        target
                    );
                }
            }
        }

        tracing::debug!(
            "Broadcasted to {} client(s) in room '{}'",
            delivered.len(),
            room_id
        );
        Ok(delivered)
    }
}
