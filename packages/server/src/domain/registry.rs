//! チャットレジストリ
//!
//! オンラインユーザー（接続 ID → 参加中ルーム）とルーム（ルーム ID → 参加者）の
//! 2 つのマップを 1 つのオブジェクトで所有します。
//!
//! 入退室などの状態遷移はすべて `&mut self` の 1 メソッド呼び出しで完結するため、
//! 呼び出し側が 1 つのロックで保護すれば遷移の途中状態が外部から観測されることはありません。
//!
//! ## 不変条件
//!
//! 接続中の全ての `c` について:
//! `online_users[c].room == Some(r)` ⇔ `rooms[r].participants` が `c` を含む

use std::collections::{BTreeMap, HashMap};

use super::{
    entity::{OnlineUser, Participant, Room},
    error::RegistryError,
    value_object::{ConnectionId, DisplayName, RoomId, Timestamp},
};

/// ルームからの退出結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub connection_id: ConnectionId,
    pub room_id: RoomId,
    /// 退出前の表示名（退出アナウンスに使う）
    pub display_name: DisplayName,
    /// 最後の参加者が抜けてルームが削除されたか
    pub room_closed: bool,
}

/// ルームへの参加結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrival {
    pub connection_id: ConnectionId,
    pub room_id: RoomId,
    pub display_name: DisplayName,
    /// 別のルームから移動してきた場合の退出結果
    pub departure: Option<Departure>,
    /// 参加後のルームの全参加者
    pub participants: BTreeMap<ConnectionId, Participant>,
}

/// join 操作の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// 既に同じルームに参加している（何もしない）
    AlreadyInRoom,
    Joined(Arrival),
}

/// オンラインユーザーとルームのレジストリ
#[derive(Debug, Default)]
pub struct ChatRegistry {
    online_users: HashMap<ConnectionId, OnlineUser>,
    rooms: HashMap<RoomId, Room>,
}

impl ChatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 接続を登録する（どのルームにも参加していない状態）
    pub fn register_connection(&mut self, connection_id: ConnectionId) -> Result<(), RegistryError> {
        if self.online_users.contains_key(&connection_id) {
            return Err(RegistryError::ConnectionAlreadyRegistered(connection_id));
        }
        self.online_users.insert(connection_id, OnlineUser::default());
        Ok(())
    }

    /// 接続を削除する
    ///
    /// ルームに参加中であれば先に退出させ、その結果を返す。
    pub fn unregister_connection(
        &mut self,
        connection_id: &ConnectionId,
    ) -> Result<Option<Departure>, RegistryError> {
        let departure = self.leave(connection_id)?;
        self.online_users.remove(connection_id);
        Ok(departure)
    }

    /// ルームに参加する
    ///
    /// 既に別のルームに参加していれば、そのルームから退出してから参加する。
    /// ルームが存在しなければ `joined_at` を作成日時として生成する。
    pub fn join(
        &mut self,
        connection_id: ConnectionId,
        room_id: RoomId,
        display_name: DisplayName,
        joined_at: Timestamp,
    ) -> Result<JoinOutcome, RegistryError> {
        let user = self
            .online_users
            .get(&connection_id)
            .ok_or(RegistryError::ConnectionNotFound(connection_id))?;
        if user.is_in_room(&room_id) {
            return Ok(JoinOutcome::AlreadyInRoom);
        }

        let departure = self.remove_from_current_room(&connection_id);

        let room = self
            .rooms
            .entry(room_id.clone())
            .or_insert_with(|| Room::new(room_id.clone(), joined_at));
        room.participants
            .insert(connection_id, Participant::new(display_name.clone()));
        let participants = room.participants.clone();

        if let Some(user) = self.online_users.get_mut(&connection_id) {
            user.room = Some(room_id.clone());
        }

        Ok(JoinOutcome::Joined(Arrival {
            connection_id,
            room_id,
            display_name,
            departure,
            participants,
        }))
    }

    /// 参加中のルームから退出する（未参加なら `Ok(None)`）
    pub fn leave(
        &mut self,
        connection_id: &ConnectionId,
    ) -> Result<Option<Departure>, RegistryError> {
        if !self.online_users.contains_key(connection_id) {
            return Err(RegistryError::ConnectionNotFound(*connection_id));
        }
        Ok(self.remove_from_current_room(connection_id))
    }

    pub fn online_user(&self, connection_id: &ConnectionId) -> Option<&OnlineUser> {
        self.online_users.get(connection_id)
    }

    pub fn current_room(&self, connection_id: &ConnectionId) -> Option<&RoomId> {
        self.online_users
            .get(connection_id)
            .and_then(|user| user.room.as_ref())
    }

    pub fn room(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    /// 全ルーム（ルーム ID 順）
    pub fn rooms(&self) -> Vec<&Room> {
        let mut rooms: Vec<&Room> = self.rooms.values().collect();
        rooms.sort_by(|a, b| a.id.cmp(&b.id));
        rooms
    }

    pub fn online_count(&self) -> usize {
        self.online_users.len()
    }

    /// 参加中のルームから外す
    ///
    /// オンラインユーザーの記録とルームの参加者が食い違っている場合は何も変更しない。
    fn remove_from_current_room(&mut self, connection_id: &ConnectionId) -> Option<Departure> {
        let room_id = self.online_users.get(connection_id)?.room.clone()?;

        let Some(participant) = self
            .rooms
            .get_mut(&room_id)
            .and_then(|room| room.participants.remove(connection_id))
        else {
            tracing::error!(
                "Connection '{}' is recorded in room '{}' but is not a participant",
                connection_id,
                room_id
            );
            return None;
        };

        let room_closed = self.rooms.get(&room_id).is_some_and(Room::is_empty);
        if room_closed {
            self.rooms.remove(&room_id);
        }
        if let Some(user) = self.online_users.get_mut(connection_id) {
            user.room = None;
        }

        Some(Departure {
            connection_id: *connection_id,
            room_id,
            display_name: participant.display_name,
            room_closed,
        })
    }
}
