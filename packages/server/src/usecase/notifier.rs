//! ルームへの通知処理
//!
//! メッセージ送信・入退室アナウンス・参加者一覧の配信をまとめたもの。
//! 各 UseCase から共有されます。
//!
//! 入退室の遷移（レジストリ更新 → 購読変更 → アナウンス → 参加者一覧）は
//! `lock_transition` のガードを保持したまま行います。全ての UseCase が同じ
//! `RoomNotifier`（のクローン）を共有するため、別の接続の遷移と交互に
//! 配信されることはありません。

use std::sync::Arc;

use roomcast_shared::time::Clock;
use tokio::sync::{Mutex, MutexGuard};

use crate::domain::{
    Arrival, Author, ConnectionId, Departure, DisplayName, Message, MessagePushError,
    MessagePusher, MessageText, Notification, RoomId, Timestamp, UserAction,
};

/// ルームへの通知を行うヘルパー
#[derive(Clone)]
pub struct RoomNotifier {
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
    /// 入退室の遷移を直列化するロック（クローン間で共有）
    transition: Arc<Mutex<()>>,
}

impl RoomNotifier {
    pub fn new(message_pusher: Arc<dyn MessagePusher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            message_pusher,
            clock,
            transition: Arc::new(Mutex::new(())),
        }
    }

    /// 入退室の遷移を開始する
    ///
    /// ガードを保持している間、他の接続の遷移は待たされる。
    pub async fn lock_transition(&self) -> MutexGuard<'_, ()> {
        self.transition.lock().await
    }

    /// MessagePusher からクライアントを登録解除する
    pub async fn unregister(&self, connection_id: &ConnectionId) {
        self.message_pusher.unregister_client(connection_id).await;
    }

    pub fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }

    /// メッセージを生成し、ルームの購読者全員（送信者を含む）に配信する
    pub async fn send_message(
        &self,
        room_id: &RoomId,
        text: MessageText,
        author: Author,
        source_connection: Option<ConnectionId>,
    ) -> Result<Message, MessagePushError> {
        let message = Message::new(author, source_connection, text, room_id.clone(), self.now());
        let notification = Notification::ReceiveMessage(message.clone());
        self.message_pusher
            .broadcast_to_room(room_id, &notification, None)
            .await?;
        Ok(message)
    }

    /// `"<name> has <action> the chat"` を Bot として配信する
    pub async fn announce(
        &self,
        room_id: &RoomId,
        display_name: &DisplayName,
        action: UserAction,
    ) -> Result<Message, MessagePushError> {
        self.send_message(room_id, action.announcement(display_name), Author::Bot, None)
            .await
    }

    /// 退出の通知
    ///
    /// 退出者自身もまだ購読中のため、退出アナウンスを受け取ってから購読解除される。
    pub async fn depart(&self, departure: &Departure) {
        if let Err(e) = self
            .announce(&departure.room_id, &departure.display_name, UserAction::Left)
            .await
        {
            tracing::warn!(
                "Failed to announce departure of '{}' from '{}': {}",
                departure.connection_id,
                departure.room_id,
                e
            );
        }
        self.message_pusher
            .unsubscribe(&departure.connection_id, &departure.room_id)
            .await;
        if departure.room_closed {
            tracing::info!("Room '{}' is empty and was removed", departure.room_id);
        }
    }

    /// 参加の通知
    ///
    /// 購読 → 参加アナウンス → 参加者一覧（参加者本人以外へ）の順に行う。
    pub async fn arrive(&self, arrival: &Arrival) {
        self.message_pusher
            .subscribe(&arrival.connection_id, &arrival.room_id)
            .await;

        if let Err(e) = self
            .announce(&arrival.room_id, &arrival.display_name, UserAction::Joined)
            .await
        {
            tracing::warn!(
                "Failed to announce arrival of '{}' in '{}': {}",
                arrival.connection_id,
                arrival.room_id,
                e
            );
        }

        let status = Notification::ParticipantsStatus(arrival.participants.clone());
        if let Err(e) = self
            .message_pusher
            .broadcast_to_room(&arrival.room_id, &status, Some(arrival.connection_id))
            .await
        {
            tracing::warn!(
                "Failed to send participants-status for '{}': {}",
                arrival.room_id,
                e
            );
        }
    }
}
