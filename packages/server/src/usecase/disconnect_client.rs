//! UseCase: 切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectClientUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 切断時にルームから退出し、オンラインユーザーが残らないことを保証
//! - 接続処理を経ていない切断でもパニックしないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：ルーム参加中の切断、ルーム未参加の切断
//! - エッジケース：未登録の接続の切断

use std::sync::Arc;

use crate::domain::{ConnectionId, Departure, RelayRepository};

use super::notifier::RoomNotifier;

/// 切断のユースケース
pub struct DisconnectClientUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RelayRepository>,
    /// ルームへの通知
    notifier: RoomNotifier,
}

impl DisconnectClientUseCase {
    /// 新しい DisconnectClientUseCase を作成
    pub fn new(repository: Arc<dyn RelayRepository>, notifier: RoomNotifier) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    /// 切断を実行
    ///
    /// 1. ルームに参加中なら退出（アナウンス + 購読解除）
    /// 2. オンラインユーザーを削除
    /// 3. MessagePusher から登録解除
    ///
    /// # Returns
    ///
    /// 参加中だったルームからの退出結果
    pub async fn execute(&self, connection_id: &ConnectionId) -> Option<Departure> {
        let _transition = self.notifier.lock_transition().await;

        let departure = match self.repository.unregister_connection(connection_id).await {
            Ok(departure) => departure,
            Err(e) => {
                tracing::warn!("Disconnect of unregistered connection: {}", e);
                None
            }
        };

        if let Some(departure) = &departure {
            self.notifier.depart(departure).await;
        }

        self.notifier.unregister(connection_id).await;
        tracing::info!("Connection '{}' disconnected", connection_id);

        departure
    }
}
