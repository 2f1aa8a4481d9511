//! ドメイン層のエラー定義

use thiserror::Error;

use super::value_object::ConnectionId;

/// Value Object の生成エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("room id must not be empty")]
    RoomIdEmpty,

    #[error("room id must be at most {0} characters")]
    RoomIdTooLong(usize),

    #[error("display name must not be empty")]
    DisplayNameEmpty,

    #[error("display name must be at most {0} characters")]
    DisplayNameTooLong(usize),

    #[error("message text must not be empty")]
    MessageTextEmpty,

    #[error("message text must be at most {0} characters")]
    MessageTextTooLong(usize),
}

/// レジストリ（オンラインユーザー・ルーム）の操作エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("connection '{0}' is not registered")]
    ConnectionNotFound(ConnectionId),

    #[error("connection '{0}' is already registered")]
    ConnectionAlreadyRegistered(ConnectionId),
}

/// メッセージ送信（通知）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("failed to push message: {0}")]
    PushFailed(String),
}
