//! ドメイン層
//!
//! - `value_object`: 検証済みの値（ID、表示名、本文、タイムスタンプ）
//! - `entity`: オンラインユーザー、ルーム、参加者、メッセージ
//! - `registry`: 2 つのマップを所有し状態遷移を行う `ChatRegistry`
//! - `repository` / `message_pusher`: Infrastructure 層が実装する trait

pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod notification;
pub mod registry;
pub mod repository;
pub mod value_object;

pub use entity::{Author, BOT_AUTHOR, Message, OnlineUser, Participant, Room, UserAction};
pub use error::{MessagePushError, RegistryError, ValueObjectError};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use notification::Notification;
pub use registry::{Arrival, ChatRegistry, Departure, JoinOutcome};
pub use repository::RelayRepository;
pub use value_object::{ConnectionId, DisplayName, MessageId, MessageText, RoomId, Timestamp};
