//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::RoomId;

/// メッセージ送信処理のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error("room '{0}' does not exist")]
    RoomNotFound(RoomId),

    #[error("failed to broadcast message: {0}")]
    BroadcastFailed(String),
}

/// ルーム詳細取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomDetailError {
    #[error("invalid room id")]
    InvalidRoomId,

    #[error("room not found")]
    RoomNotFound,
}
