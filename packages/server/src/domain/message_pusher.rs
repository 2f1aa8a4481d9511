//! MessagePusher trait 定義
//!
//! クライアントへの通知（push）のインターフェース。
//! トランスポートが提供する「ルーム単位の購読」と「ルームへのブロードキャスト」を抽象化します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError, Notification, RoomId};

/// クライアントへの送信チャンネル（シリアライズ済みのフレームを流す）
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// クライアントの送信チャンネルを登録
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// クライアントの登録を解除（全てのルームの購読も解除される）
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// ルームのブロードキャストチャンネルを購読
    async fn subscribe(&self, connection_id: &ConnectionId, room_id: &RoomId);

    /// ルームのブロードキャストチャンネルの購読を解除
    async fn unsubscribe(&self, connection_id: &ConnectionId, room_id: &RoomId);

    /// ルームの購読者全員に通知（`exclude` を除く）
    ///
    /// 実際に送信できたクライアント ID を返す。
    async fn broadcast_to_room(
        &self,
        room_id: &RoomId,
        notification: &Notification,
        exclude: Option<ConnectionId>,
    ) -> Result<Vec<ConnectionId>, MessagePushError>;
}
