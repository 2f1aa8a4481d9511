//! Entity 定義

use std::{collections::BTreeMap, fmt};

use super::value_object::{ConnectionId, DisplayName, MessageId, MessageText, RoomId, Timestamp};

/// システムメッセージの送信者として使われるセンチネル値
pub const BOT_AUTHOR: &str = "BOT";

/// オンラインユーザー
///
/// 接続ごとに 1 つ存在し、参加中のルームを高々 1 つ保持する。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnlineUser {
    pub room: Option<RoomId>,
}

impl OnlineUser {
    pub fn is_in_room(&self, room_id: &RoomId) -> bool {
        self.room.as_ref() == Some(room_id)
    }
}

/// ルーム内の参加者
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub display_name: DisplayName,
}

impl Participant {
    pub fn new(display_name: DisplayName) -> Self {
        Self { display_name }
    }
}

/// ルーム
///
/// 最初の参加者の join で生成され、最後の参加者が抜けた時点で削除される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub participants: BTreeMap<ConnectionId, Participant>,
    pub created_at: Timestamp,
}

impl Room {
    pub fn new(id: RoomId, created_at: Timestamp) -> Self {
        Self {
            id,
            participants: BTreeMap::new(),
            created_at,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }
}

/// メッセージの送信者
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Author {
    User(DisplayName),
    Bot,
}

impl Author {
    /// `userName` が無い場合は Bot として扱う
    pub fn from_optional(display_name: Option<DisplayName>) -> Self {
        display_name.map_or(Self::Bot, Self::User)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::User(name) => name.as_str(),
            Self::Bot => BOT_AUTHOR,
        }
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ルームへ配信されるメッセージ（保存はしない）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub author: Author,
    pub source_connection: Option<ConnectionId>,
    pub text: MessageText,
    pub room: RoomId,
    pub timestamp: Timestamp,
}

impl Message {
    /// 新しい ID を払い出してメッセージを生成
    pub fn new(
        author: Author,
        source_connection: Option<ConnectionId>,
        text: MessageText,
        room: RoomId,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id: MessageId::generate(),
            author,
            source_connection,
            text,
            room,
            timestamp,
        }
    }
}

/// 入退室アナウンスの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Joined,
    Left,
}

impl UserAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Joined => "joined",
            Self::Left => "left",
        }
    }

    /// `"<name> has <action> the chat"` 形式のアナウンス文を生成
    pub fn announcement(&self, display_name: &DisplayName) -> MessageText {
        MessageText::from_trusted(format!("{} has {} the chat", display_name, self.as_str()))
    }
}
