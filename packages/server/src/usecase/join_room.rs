//! UseCase: ルーム参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - 参加アナウンス・参加者一覧の配信順序と配信範囲
//!
//! ### なぜこのテストが必要か
//! - 同じルームへの再参加で副作用が起きないことを保証
//! - ルーム移動時に「退出 → 参加」の順でアナウンスされることを保証
//! - participants-status が参加者本人に送られないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規参加、2 人目の参加、別ルームへの移動
//! - エッジケース：同じルームへの再参加
//! - 異常系：未登録の接続からの参加

use std::sync::Arc;

use crate::domain::{ConnectionId, DisplayName, JoinOutcome, RegistryError, RelayRepository, RoomId};

use super::notifier::RoomNotifier;

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RelayRepository>,
    /// ルームへの通知
    notifier: RoomNotifier,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(repository: Arc<dyn RelayRepository>, notifier: RoomNotifier) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    /// ルーム参加を実行
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 参加する接続
    /// * `room_id` - 参加先のルーム
    /// * `display_name` - ルーム内での表示名
    ///
    /// # Returns
    ///
    /// * `Ok(JoinOutcome::AlreadyInRoom)` - 既に同じルームに参加している（何もしない）
    /// * `Ok(JoinOutcome::Joined(_))` - 参加成功
    /// * `Err(RegistryError::ConnectionNotFound)` - 未登録の接続
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        room_id: RoomId,
        display_name: DisplayName,
    ) -> Result<JoinOutcome, RegistryError> {
        // 通知が終わるまで他の接続の遷移を待たせる
        let _transition = self.notifier.lock_transition().await;

        // 1. レジストリを 1 回の更新で遷移させる（退出 + 参加）
        let outcome = self
            .repository
            .join_room(connection_id, room_id, display_name, self.notifier.now())
            .await?;

        let JoinOutcome::Joined(arrival) = &outcome else {
            tracing::debug!("Connection '{}' is already in the room", connection_id);
            return Ok(outcome);
        };

        // 2. 元のルームへの退出通知
        if let Some(departure) = &arrival.departure {
            self.notifier.depart(departure).await;
        }

        // 3. 新しいルームへの参加通知
        self.notifier.arrive(arrival).await;

        tracing::info!(
            "'{}' ({}) joined room '{}'",
            arrival.display_name,
            connection_id,
            arrival.room_id
        );

        Ok(outcome)
    }
}
