//! UseCase: ルーム退出処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - LeaveRoomUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 退出アナウンスが退出者本人を含むルーム全体に届くことを保証
//! - 退出後はルームのメッセージが届かないことを保証
//! - 未参加・未登録の接続での退出が安全に無視されることを保証

use std::sync::Arc;

use crate::domain::{ConnectionId, Departure, RelayRepository};

use super::notifier::RoomNotifier;

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RelayRepository>,
    /// ルームへの通知
    notifier: RoomNotifier,
}

impl LeaveRoomUseCase {
    /// 新しい LeaveRoomUseCase を作成
    pub fn new(repository: Arc<dyn RelayRepository>, notifier: RoomNotifier) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    /// ルーム退出を実行
    ///
    /// ルームに参加していない場合や接続が未登録の場合は何もしない（冪等）。
    ///
    /// # Returns
    ///
    /// * `Some(Departure)` - 退出した
    /// * `None` - 退出すべきルームが無かった
    pub async fn execute(&self, connection_id: &ConnectionId) -> Option<Departure> {
        let _transition = self.notifier.lock_transition().await;

        let departure = match self.repository.leave_room(connection_id).await {
            Ok(departure) => departure?,
            Err(e) => {
                tracing::debug!("Ignoring leave-room: {}", e);
                return None;
            }
        };

        self.notifier.depart(&departure).await;
        tracing::info!(
            "'{}' ({}) left room '{}'",
            departure.display_name,
            connection_id,
            departure.room_id
        );

        Some(departure)
    }
}
