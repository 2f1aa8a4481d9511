//! Conversion logic between DTOs and domain entities.

use std::collections::BTreeMap;

use roomcast_shared::time::timestamp_to_rfc3339;

use crate::domain::{ConnectionId, Message, Notification, Participant, Room};
use crate::infrastructure::dto::{http, websocket as dto};

// ========================================
// Domain Entity → WebSocket DTO
// ========================================

impl From<&Message> for dto::MessageDto {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.to_string(),
            author: message.author.to_string(),
            socket_id: message.source_connection.map(|id| id.to_string()),
            text: message.text.as_str().to_string(),
            room: message.room.as_str().to_string(),
            time: message.timestamp.value(),
        }
    }
}

impl From<&Participant> for dto::ParticipantDto {
    fn from(participant: &Participant) -> Self {
        Self {
            user_name: participant.display_name.as_str().to_string(),
        }
    }
}

/// Build the `participants-status` payload (connection id → participant)
pub fn participants_to_dto(
    participants: &BTreeMap<ConnectionId, Participant>,
) -> BTreeMap<String, dto::ParticipantDto> {
    participants
        .iter()
        .map(|(connection_id, participant)| (connection_id.to_string(), participant.into()))
        .collect()
}

impl From<&Notification> for dto::ServerEvent {
    fn from(notification: &Notification) -> Self {
        match notification {
            Notification::ReceiveMessage(message) => Self::ReceiveMessage(message.into()),
            Notification::ParticipantsStatus(participants) => {
                Self::ParticipantsStatus(participants_to_dto(participants))
            }
        }
    }
}

// ========================================
// Domain Entity → HTTP DTO
// ========================================

impl From<&Room> for http::RoomSummaryDto {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.as_str().to_string(),
            participant_count: room.participant_count(),
            created_at: timestamp_to_rfc3339(room.created_at.value()),
        }
    }
}

impl From<&Room> for http::RoomDetailDto {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.as_str().to_string(),
            participants: room
                .participants
                .iter()
                .map(|(connection_id, participant)| http::ParticipantDetailDto {
                    connection_id: connection_id.to_string(),
                    user_name: participant.display_name.as_str().to_string(),
                })
                .collect(),
            created_at: timestamp_to_rfc3339(room.created_at.value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Author, DisplayName, MessageText, RoomId, Timestamp};

    fn room_id(value: &str) -> RoomId {
        RoomId::new(value.to_string()).unwrap()
    }

    fn participant(value: &str) -> Participant {
        Participant::new(DisplayName::new(value.to_string()).unwrap())
    }

    #[test]
    fn test_domain_message_to_dto() {
        // テスト項目: ドメインの Message が receive-message の DTO に変換される
        // given (前提条件):
        let source = ConnectionId::generate();
        let message = Message::new(
            Author::User(DisplayName::new("alice".to_string()).unwrap()),
            Some(source),
            MessageText::new("hi".to_string()).unwrap(),
            room_id("lobby"),
            Timestamp::new(2000),
        );

        // when (操作):
        let dto: dto::MessageDto = (&message).into();

        // then (期待する結果):
        assert_eq!(dto.id, message.id.to_string());
        assert_eq!(dto.author, "alice");
        assert_eq!(dto.socket_id, Some(source.to_string()));
        assert_eq!(dto.text, "hi");
        assert_eq!(dto.room, "lobby");
        assert_eq!(dto.time, 2000);
    }

    #[test]
    fn test_bot_message_has_no_socket_id() {
        // テスト項目: Bot のメッセージは author が BOT で socket_id を持たない
        // given (前提条件):
        let message = Message::new(
            Author::Bot,
            None,
            MessageText::new("alice has joined the chat".to_string()).unwrap(),
            room_id("lobby"),
            Timestamp::new(0),
        );

        // when (操作):
        let dto: dto::MessageDto = (&message).into();

        // then (期待する結果):
        assert_eq!(dto.author, "BOT");
        assert_eq!(dto.socket_id, None);
    }

    #[test]
    fn test_participants_status_notification_to_dto() {
        // テスト項目: 参加者一覧の通知が接続 ID をキーとするマップに変換される
        // given (前提条件):
        let alice = ConnectionId::generate();
        let mut participants = BTreeMap::new();
        participants.insert(alice, participant("alice"));
        let notification = Notification::ParticipantsStatus(participants);

        // when (操作):
        let event: dto::ServerEvent = (&notification).into();

        // then (期待する結果):
        let dto::ServerEvent::ParticipantsStatus(map) = event else {
            panic!("expected participants-status");
        };
        assert_eq!(map.len(), 1);
        assert_eq!(map[&alice.to_string()].user_name, "alice");
    }

    #[test]
    fn test_room_to_detail_dto() {
        // テスト項目: Room が HTTP の詳細 DTO に変換される
        // given (前提条件):
        let alice = ConnectionId::generate();
        let mut room = Room::new(room_id("lobby"), Timestamp::new(1672531200000));
        room.participants.insert(alice, participant("alice"));

        // when (操作):
        let detail: http::RoomDetailDto = (&room).into();
        let summary: http::RoomSummaryDto = (&room).into();

        // then (期待する結果):
        assert_eq!(detail.id, "lobby");
        assert_eq!(detail.participants.len(), 1);
        assert_eq!(detail.participants[0].connection_id, alice.to_string());
        assert_eq!(detail.participants[0].user_name, "alice");
        assert_eq!(detail.created_at, "2023-01-01T00:00:00+00:00");
        assert_eq!(summary.participant_count, 1);
    }
}
