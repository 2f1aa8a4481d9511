//! UseCase: ルーム詳細取得

use std::sync::Arc;

use crate::domain::{RelayRepository, Room, RoomId};

use super::error::GetRoomDetailError;

/// ルーム詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    repository: Arc<dyn RelayRepository>,
}

impl GetRoomDetailUseCase {
    pub fn new(repository: Arc<dyn RelayRepository>) -> Self {
        Self { repository }
    }

    /// ルーム詳細を取得
    ///
    /// # Arguments
    ///
    /// * `room_id` - パスパラメータのルーム ID（未検証の文字列）
    pub async fn execute(&self, room_id: String) -> Result<Room, GetRoomDetailError> {
        let room_id = RoomId::new(room_id).map_err(|_| GetRoomDetailError::InvalidRoomId)?;
        self.repository
            .get_room(&room_id)
            .await
            .ok_or(GetRoomDetailError::RoomNotFound)
    }
}
