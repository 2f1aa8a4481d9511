//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - メッセージ送信処理（配信範囲、ID の一意性、送信者の既定値）
//!
//! ### なぜこのテストが必要か
//! - メッセージが送信者を含むルーム全体に 1 回だけ届くことを保証
//! - 存在しないルームへの送信が拒否されることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：メッセージ送信とブロードキャスト
//! - 異常系：存在しないルームへの送信、ブロードキャスト失敗

use std::sync::Arc;

use crate::domain::{Author, ConnectionId, Message, MessageText, RelayRepository, RoomId};

use super::{error::SendMessageError, notifier::RoomNotifier};

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RelayRepository>,
    /// ルームへの通知
    notifier: RoomNotifier,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(repository: Arc<dyn RelayRepository>, notifier: RoomNotifier) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `room_id` - 送信先のルーム
    /// * `text` - メッセージ本文
    /// * `author` - 送信者（`userName` が無ければ `Author::Bot`）
    /// * `source_connection` - 送信元の接続
    ///
    /// # Returns
    ///
    /// * `Ok(Message)` - 配信したメッセージ
    /// * `Err(SendMessageError)` - 送信失敗
    pub async fn execute(
        &self,
        room_id: RoomId,
        text: MessageText,
        author: Author,
        source_connection: Option<ConnectionId>,
    ) -> Result<Message, SendMessageError> {
        // 1. 送信先のルームが存在するか確認
        if self.repository.get_room(&room_id).await.is_none() {
            return Err(SendMessageError::RoomNotFound(room_id));
        }

        // 2. ルームの購読者全員（送信者を含む）にブロードキャスト
        let message = self
            .notifier
            .send_message(&room_id, text, author, source_connection)
            .await
            .map_err(|e| SendMessageError::BroadcastFailed(e.to_string()))?;

        tracing::info!(
            "Message '{}' from '{}' broadcast to room '{}'",
            message.id,
            message.author,
            room_id
        );

        Ok(message)
    }
}
