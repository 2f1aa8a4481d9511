//! UseCase 層
//!
//! インバウンドイベント（connect / join-room / leave-room / send-message / disconnect）
//! と HTTP の参照系 API ごとにユースケースを定義します。

pub mod connect_client;
pub mod disconnect_client;
pub mod error;
pub mod get_room_detail;
pub mod get_rooms;
pub mod join_room;
pub mod leave_room;
pub mod notifier;
pub mod send_message;

#[cfg(test)]
pub(crate) mod test_support;

pub use connect_client::ConnectClientUseCase;
pub use disconnect_client::DisconnectClientUseCase;
pub use error::{GetRoomDetailError, SendMessageError};
pub use get_room_detail::GetRoomDetailUseCase;
pub use get_rooms::GetRoomsUseCase;
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use notifier::RoomNotifier;
pub use send_message::SendMessageUseCase;
