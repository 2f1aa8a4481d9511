//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    ConnectionId, Departure, DisplayName, JoinOutcome, RegistryError, Room, RoomId, Timestamp,
};

/// Relay Repository trait
///
/// オンラインユーザーとルームの状態へのインターフェース。
/// 各メソッドは 1 つの状態遷移をアトミックに実行することを実装に要求します。
#[async_trait]
pub trait RelayRepository: Send + Sync {
    /// 接続を登録
    async fn register_connection(&self, connection_id: ConnectionId) -> Result<(), RegistryError>;

    /// 接続を削除（参加中のルームがあれば退出させる）
    async fn unregister_connection(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Option<Departure>, RegistryError>;

    /// ルームに参加
    async fn join_room(
        &self,
        connection_id: ConnectionId,
        room_id: RoomId,
        display_name: DisplayName,
        joined_at: Timestamp,
    ) -> Result<JoinOutcome, RegistryError>;

    /// 参加中のルームから退出
    async fn leave_room(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Option<Departure>, RegistryError>;

    /// 接続が参加中のルーム ID を取得
    async fn get_current_room(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Option<RoomId>, RegistryError>;

    /// Room エンティティを取得
    async fn get_room(&self, room_id: &RoomId) -> Option<Room>;

    /// 全 Room エンティティを取得（ルーム ID 順）
    async fn get_rooms(&self) -> Vec<Room>;

    /// オンラインユーザー数を取得
    async fn count_online_users(&self) -> usize;
}
