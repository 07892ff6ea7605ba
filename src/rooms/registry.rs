use std::collections::{HashMap, HashSet};

use uuid::Uuid;

pub type ConnectionId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub display_name: String,
    pub room: String,
}

/// Who is connected as whom, and which room they sit in.
///
/// `sessions` and `rooms` are always updated together, so a connection is a
/// member of exactly the room its session names and of no other.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<ConnectionId, Session>,
    rooms: HashMap<String, HashSet<ConnectionId>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `display_name` and `room` for `conn`, replacing whatever it joined before.
    ///
    /// Returns the session that was replaced. Neither the name nor the room is
    /// validated, and names need not be unique.
    pub fn join(&mut self, conn: ConnectionId, display_name: String, room: String) -> Option<Session> {
        let previous = self.leave_room(conn);

        self.rooms.entry(room.clone()).or_default().insert(conn);
        self.sessions.insert(conn, Session { display_name, room });

        previous
    }

    /// Forgets `conn`. Returns `None` if it never joined a room.
    pub fn remove(&mut self, conn: ConnectionId) -> Option<Session> {
        self.leave_room(conn)
    }

    pub fn session(&self, conn: ConnectionId) -> Option<&Session> {
        self.sessions.get(&conn)
    }

    pub fn members(&self, room: &str) -> impl Iterator<Item = ConnectionId> + '_ {
        self.rooms.get(room).into_iter().flatten().copied()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn leave_room(&mut self, conn: ConnectionId) -> Option<Session> {
        let session = self.sessions.remove(&conn)?;

        if let Some(members) = self.rooms.get_mut(&session.room) {
            members.remove(&conn);
            if members.is_empty() {
                self.rooms.remove(&session.room);
            }
        }

        Some(session)
    }
}
