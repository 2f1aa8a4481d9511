//! Value Object 定義
//!
//! 生成時にバリデーションを行い、不正な値を持つインスタンスが存在しないことを保証します。

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValueObjectError;

/// RoomId の最大文字数
pub const ROOM_ID_MAX_LEN: usize = 64;
/// DisplayName の最大文字数
pub const DISPLAY_NAME_MAX_LEN: usize = 32;
/// MessageText の最大文字数
pub const MESSAGE_TEXT_MAX_LEN: usize = 2000;

/// 接続 ID
///
/// WebSocket 接続ごとにサーバーが払い出す不透明な識別子。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// 新しい接続 ID を生成（UUID v4）
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// ルーム ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(String);

impl RoomId {
    /// 前後の空白を除去した上で検証する
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::RoomIdEmpty);
        }
        if trimmed.chars().count() > ROOM_ID_MAX_LEN {
            return Err(ValueObjectError::RoomIdTooLong(ROOM_ID_MAX_LEN));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 表示名
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::DisplayNameEmpty);
        }
        if trimmed.chars().count() > DISPLAY_NAME_MAX_LEN {
            return Err(ValueObjectError::DisplayNameTooLong(DISPLAY_NAME_MAX_LEN));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// メッセージ本文
///
/// 本文は加工せずそのまま保持する（空白のみの本文は不可）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageText(String);

impl MessageText {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::MessageTextEmpty);
        }
        if value.chars().count() > MESSAGE_TEXT_MAX_LEN {
            return Err(ValueObjectError::MessageTextTooLong(MESSAGE_TEXT_MAX_LEN));
        }
        Ok(Self(value))
    }

    /// 検証済みの部品から組み立てた本文（システムアナウンス用）
    pub(crate) fn from_trusted(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MessageText {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// メッセージ ID（UUID v4）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unix タイムスタンプ（ミリ秒、UTC）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_id_trims_whitespace() {
        // テスト項目: RoomId は前後の空白を除去して保持する
        // given (前提条件):
        let raw = "  lobby  ".to_string();

        // when (操作):
        let room_id = RoomId::new(raw).unwrap();

        // then (期待する結果):
        assert_eq!(room_id.as_str(), "lobby");
    }

    #[test]
    fn test_room_id_rejects_blank() {
        // テスト項目: 空白のみの RoomId はエラーになる
        // given (前提条件):
        let raw = "   ".to_string();

        // when (操作):
        let result = RoomId::new(raw);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::RoomIdEmpty));
    }

    #[test]
    fn test_room_id_rejects_too_long() {
        // テスト項目: 最大文字数を超える RoomId はエラーになる
        // given (前提条件):
        let raw = "r".repeat(ROOM_ID_MAX_LEN + 1);

        // when (操作):
        let result = RoomId::new(raw);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::RoomIdTooLong(ROOM_ID_MAX_LEN)));
    }

    #[test]
    fn test_display_name_counts_characters_not_bytes() {
        // テスト項目: DisplayName の長さはバイト数ではなく文字数で判定される
        // given (前提条件): マルチバイト文字で最大文字数ちょうど
        let raw = "あ".repeat(DISPLAY_NAME_MAX_LEN);

        // when (操作):
        let result = DisplayName::new(raw.clone());

        // then (期待する結果):
        assert_eq!(result.unwrap().as_str(), raw);
    }

    #[test]
    fn test_display_name_rejects_empty() {
        // テスト項目: 空の DisplayName はエラーになる
        // given (前提条件):

        // when (操作):
        let result = DisplayName::new(String::new());

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::DisplayNameEmpty));
    }

    #[test]
    fn test_message_text_keeps_surrounding_whitespace() {
        // テスト項目: MessageText は本文を加工せずに保持する
        // given (前提条件):
        let raw = "  hi there ".to_string();

        // when (操作):
        let text = MessageText::new(raw.clone()).unwrap();

        // then (期待する結果):
        assert_eq!(text.as_str(), raw);
    }

    #[test]
    fn test_message_text_rejects_blank_and_too_long() {
        // テスト項目: 空白のみ・最大文字数超過の MessageText はエラーになる
        // given (前提条件):
        let blank = " \n\t".to_string();
        let too_long = "a".repeat(MESSAGE_TEXT_MAX_LEN + 1);

        // when (操作):
        let blank_result = MessageText::new(blank);
        let too_long_result = MessageText::new(too_long);

        // then (期待する結果):
        assert_eq!(blank_result, Err(ValueObjectError::MessageTextEmpty));
        assert_eq!(
            too_long_result,
            Err(ValueObjectError::MessageTextTooLong(MESSAGE_TEXT_MAX_LEN))
        );
    }

    #[test]
    fn test_message_id_is_unique_per_generation() {
        // テスト項目: MessageId は生成ごとに異なる値になる
        // given (前提条件):

        // when (操作):
        let first = MessageId::generate();
        let second = MessageId::generate();

        // then (期待する結果):
        assert_ne!(first, second);
    }
}
