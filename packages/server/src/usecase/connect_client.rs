//! UseCase: 接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectClientUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 接続直後のクライアントがどのルームにも属さないことを保証
//! - 同じ接続 ID の二重登録を防ぐ
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規接続
//! - 異常系：同じ接続 ID での再登録

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, PusherChannel, RegistryError, RelayRepository};

/// 接続のユースケース
pub struct ConnectClientUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RelayRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectClientUseCase {
    /// 新しい ConnectClientUseCase を作成
    pub fn new(
        repository: Arc<dyn RelayRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 接続を実行
    ///
    /// # Arguments
    ///
    /// * `connection_id` - トランスポートが払い出した接続 ID
    /// * `sender` - クライアントへのメッセージ送信用チャンネル
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        sender: PusherChannel,
    ) -> Result<(), RegistryError> {
        // 1. オンラインユーザーとして登録（ルーム未参加）
        self.repository.register_connection(connection_id).await?;

        // 2. MessagePusher にクライアントを登録
        self.message_pusher
            .register_client(connection_id, sender)
            .await;

        Ok(())
    }
}
