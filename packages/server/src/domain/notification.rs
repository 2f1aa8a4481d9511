//! クライアントへ通知するドメインイベント

use std::collections::BTreeMap;

use super::{
    entity::{Message, Participant},
    value_object::ConnectionId,
};

/// ルームの購読者へ配信する通知
///
/// ワイヤーフォーマットへの変換は MessagePusher の実装が担当します。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// ルームへのメッセージ配信（`receive-message`）
    ReceiveMessage(Message),
    /// ルームの参加者一覧（`participants-status`）
    ParticipantsStatus(BTreeMap<ConnectionId, Participant>),
}
