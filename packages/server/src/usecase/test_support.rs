//! UseCase テスト用のヘルパー

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use roomcast_shared::time::FixedClock;
use tokio::sync::mpsc;

use crate::{
    domain::{
        ConnectionId, DisplayName, MessagePushError, MessagePusher, Notification, PusherChannel,
        RelayRepository, RoomId,
    },
    infrastructure::{
        dto::websocket::{MessageDto, ServerEvent},
        message_pusher::WebSocketMessagePusher,
        repository::InMemoryRelayRepository,
    },
};

use super::notifier::RoomNotifier;

pub const FIXED_NOW: i64 = 1_700_000_000_000;

pub struct Fixture {
    pub repository: Arc<InMemoryRelayRepository>,
    pub message_pusher: Arc<WebSocketMessagePusher>,
    /// 全ての UseCase で共有する通知ヘルパー
    pub notifier: RoomNotifier,
}

impl Fixture {
    pub fn new() -> Self {
        let message_pusher = Arc::new(WebSocketMessagePusher::new());
        Self::build(message_pusher.clone(), message_pusher)
    }

    /// 指定した接続の購読変更だけを遅らせる MessagePusher を使う Fixture
    pub fn delayed(delay: Duration) -> (Self, Arc<DelayedPusher>) {
        let message_pusher = Arc::new(WebSocketMessagePusher::new());
        let delayed = Arc::new(DelayedPusher::new(message_pusher.clone(), delay));
        (Self::build(message_pusher, delayed.clone()), delayed)
    }

    fn build(
        message_pusher: Arc<WebSocketMessagePusher>,
        notify_through: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository: Arc::new(InMemoryRelayRepository::default()),
            message_pusher,
            notifier: RoomNotifier::new(notify_through, Arc::new(FixedClock::new(FIXED_NOW))),
        }
    }

    /// 接続を登録し、そのクライアントへの受信チャンネルを返す
    pub async fn connect(&self) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let connection_id = ConnectionId::generate();
        let (tx, rx) = mpsc::unbounded_channel();
        self.repository
            .register_connection(connection_id)
            .await
            .unwrap();
        self.message_pusher.register_client(connection_id, tx).await;
        (connection_id, rx)
    }
}

pub fn room(value: &str) -> RoomId {
    RoomId::new(value.to_string()).unwrap()
}

pub fn name(value: &str) -> DisplayName {
    DisplayName::new(value.to_string()).unwrap()
}

/// 受信済みのフレームを全て取り出してパースする
pub fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        events.push(serde_json::from_str(&frame).unwrap());
    }
    events
}

/// receive-message イベントの本文だけを取り出す
pub fn texts(events: &[ServerEvent]) -> Vec<String> {
    messages(events).into_iter().map(|m| m.text).collect()
}

pub fn messages(events: &[ServerEvent]) -> Vec<MessageDto> {
    events
        .iter()
        .filter_map(|event| match event {
            ServerEvent::ReceiveMessage(message) => Some(message.clone()),
            _ => None,
        })
        .collect()
}

/// subscribe / unsubscribe を遅らせる MessagePusher
///
/// 遷移の途中で別のイベントが割り込む状況を作るために使う。
pub struct DelayedPusher {
    inner: Arc<WebSocketMessagePusher>,
    delay: Duration,
    slow: Mutex<HashSet<ConnectionId>>,
}

impl DelayedPusher {
    pub fn new(inner: Arc<WebSocketMessagePusher>, delay: Duration) -> Self {
        Self {
            inner,
            delay,
            slow: Mutex::new(HashSet::new()),
        }
    }

    /// 以降、この接続の購読変更を遅らせる
    pub fn slow_down(&self, connection_id: ConnectionId) {
        self.slow.lock().unwrap().insert(connection_id);
    }

    async fn maybe_wait(&self, connection_id: &ConnectionId) {
        let is_slow = self.slow.lock().unwrap().contains(connection_id);
        if is_slow {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl MessagePusher for DelayedPusher {
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel) {
        self.inner.register_client(connection_id, sender).await;
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) {
        self.inner.unregister_client(connection_id).await;
    }

    async fn subscribe(&self, connection_id: &ConnectionId, room_id: &RoomId) {
        self.maybe_wait(connection_id).await;
        self.inner.subscribe(connection_id, room_id).await;
    }

    async fn unsubscribe(&self, connection_id: &ConnectionId, room_id: &RoomId) {
        self.maybe_wait(connection_id).await;
        self.inner.unsubscribe(connection_id, room_id).await;
    }

    async fn broadcast_to_room(
        &self,
        room_id: &RoomId,
        notification: &Notification,
        exclude: Option<ConnectionId>,
    ) -> Result<Vec<ConnectionId>, MessagePushError> {
        self.inner
            .broadcast_to_room(room_id, notification, exclude)
            .await
    }
}
