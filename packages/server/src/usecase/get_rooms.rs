//! UseCase: ルーム一覧取得

use std::sync::Arc;

use crate::domain::{RelayRepository, Room};

/// ルーム一覧取得のユースケース
pub struct GetRoomsUseCase {
    repository: Arc<dyn RelayRepository>,
}

impl GetRoomsUseCase {
    pub fn new(repository: Arc<dyn RelayRepository>) -> Self {
        Self { repository }
    }

    /// 現在存在する全てのルーム（ルーム ID 順）
    pub async fn execute(&self) -> Vec<Room> {
        self.repository.get_rooms().await
    }
}
