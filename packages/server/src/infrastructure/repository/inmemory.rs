//! InMemory Relay Repository 実装
//!
//! ドメイン層が定義する RelayRepository trait の具体的な実装。
//! `ChatRegistry` を 1 つの Mutex で保護し、インメモリ DB として使用します。
//! 各メソッドはロックを 1 回だけ取得するため、入退室の遷移は他の接続のイベントと
//! 交錯しません。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ChatRegistry, ConnectionId, Departure, DisplayName, JoinOutcome, RegistryError,
    RelayRepository, Room, RoomId, Timestamp,
};

/// インメモリ Relay Repository 実装
pub struct InMemoryRelayRepository {
    registry: Arc<Mutex<ChatRegistry>>,
}

impl InMemoryRelayRepository {
    /// 新しい InMemoryRelayRepository を作成
    pub fn new(registry: Arc<Mutex<ChatRegistry>>) -> Self {
        Self { registry }
    }
}

impl Default for InMemoryRelayRepository {
    fn default() -> Self {
        Self::new(Arc::new(Mutex::new(ChatRegistry::new())))
    }
}

#[async_trait]
impl RelayRepository for InMemoryRelayRepository {
    async fn register_connection(&self, connection_id: ConnectionId) -> Result<(), RegistryError> {
        let mut registry = self.registry.lock().await;
        registry.register_connection(connection_id)
    }

    async fn unregister_connection(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Option<Departure>, RegistryError> {
        let mut registry = self.registry.lock().await;
        registry.unregister_connection(connection_id)
    }

    async fn join_room(
        &self,
        connection_id: ConnectionId,
        room_id: RoomId,
        display_name: DisplayName,
        joined_at: Timestamp,
    ) -> Result<JoinOutcome, RegistryError> {
        let mut registry = self.registry.lock().await;
        registry.join(connection_id, room_id, display_name, joined_at)
    }

    async fn leave_room(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Option<Departure>, RegistryError> {
        let mut registry = self.registry.lock().await;
        registry.leave(connection_id)
    }

    async fn get_current_room(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Option<RoomId>, RegistryError> {
        let registry = self.registry.lock().await;
        registry
            .online_user(connection_id)
            .map(|user| user.room.clone())
            .ok_or(RegistryError::ConnectionNotFound(*connection_id))
    }

    async fn get_room(&self, room_id: &RoomId) -> Option<Room> {
        let registry = self.registry.lock().await;
        registry.room(room_id).cloned()
    }

    async fn get_rooms(&self) -> Vec<Room> {
        let registry = self.registry.lock().await;
        registry.rooms().into_iter().cloned().collect()
    }

    async fn count_online_users(&self) -> usize {
        let registry = self.registry.lock().await;
        registry.online_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - InMemoryRelayRepository が ChatRegistry の遷移をそのまま公開していること
    // - 並行した join でも参加者が失われないこと
    //
    // 【なぜこのテストが必要か】
    // - UseCase 層はこの trait 実装を通してのみ状態を変更する
    // - 複数の接続のイベントが並行に処理されても整合性が保たれることを保証する
    // ========================================

    fn room(value: &str) -> RoomId {
        RoomId::new(value.to_string()).unwrap()
    }

    fn name(value: &str) -> DisplayName {
        DisplayName::new(value.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_register_and_join() {
        // テスト項目: 登録した接続がルームに参加でき、参加中ルームを取得できる
        // given (前提条件):
        let repo = InMemoryRelayRepository::default();
        let alice = ConnectionId::generate();
        repo.register_connection(alice).await.unwrap();

        // when (操作):
        let outcome = repo
            .join_room(alice, room("lobby"), name("alice"), Timestamp::new(1000))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(matches!(outcome, JoinOutcome::Joined(_)));
        assert_eq!(repo.get_current_room(&alice).await, Ok(Some(room("lobby"))));
        assert_eq!(repo.get_rooms().await.len(), 1);
        assert_eq!(repo.count_online_users().await, 1);
    }

    #[tokio::test]
    async fn test_get_current_room_of_unknown_connection() {
        // テスト項目: 未登録の接続の参加中ルーム取得はエラーになる
        // given (前提条件):
        let repo = InMemoryRelayRepository::default();
        let ghost = ConnectionId::generate();

        // when (操作):
        let result = repo.get_current_room(&ghost).await;

        // then (期待する結果):
        assert_eq!(result, Err(RegistryError::ConnectionNotFound(ghost)));
    }

    #[tokio::test]
    async fn test_unregister_removes_participant_and_empty_room() {
        // テスト項目: 接続削除で参加者と空になったルームが削除される
        // given (前提条件):
        let repo = InMemoryRelayRepository::default();
        let alice = ConnectionId::generate();
        repo.register_connection(alice).await.unwrap();
        repo.join_room(alice, room("lobby"), name("alice"), Timestamp::new(1000))
            .await
            .unwrap();

        // when (操作):
        let departure = repo.unregister_connection(&alice).await.unwrap();

        // then (期待する結果):
        assert_eq!(departure.map(|d| d.room_closed), Some(true));
        assert!(repo.get_room(&room("lobby")).await.is_none());
        assert_eq!(repo.count_online_users().await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_joins_keep_every_participant() {
        // テスト項目: 並行に join しても全ての参加者がルームに登録される
        // given (前提条件):
        let repo = Arc::new(InMemoryRelayRepository::default());
        let connection_ids: Vec<ConnectionId> = (0..32).map(|_| ConnectionId::generate()).collect();
        for connection_id in &connection_ids {
            repo.register_connection(*connection_id).await.unwrap();
        }

        // when (操作):
        let handles: Vec<_> = connection_ids
            .iter()
            .enumerate()
            .map(|(i, connection_id)| {
                let repo = repo.clone();
                let connection_id = *connection_id;
                tokio::spawn(async move {
                    repo.join_room(
                        connection_id,
                        room("lobby"),
                        name(&format!("user{i}")),
                        Timestamp::new(0),
                    )
                    .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // then (期待する結果):
        let lobby = repo.get_room(&room("lobby")).await.unwrap();
        assert_eq!(lobby.participant_count(), connection_ids.len());
    }
}
