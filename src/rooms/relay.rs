use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{
    events::{ClientEvent, ServerEvent},
    registry::{ConnectionId, SessionRegistry},
};

/// Pending outbound events for one connection.
pub type Outbox = mpsc::UnboundedSender<ServerEvent>;

/// Hands `event` to every outbox in `recipients`.
///
/// Fire and forget: an outbox whose socket has already gone away just drops it.
pub fn broadcast<'a>(recipients: impl IntoIterator<Item = &'a Outbox>, event: &ServerEvent) {
    for outbox in recipients {
        let _ = outbox.send(event.clone());
    }
}

/// Room membership plus the outboxes needed to reach each member.
#[derive(Debug, Default)]
pub struct Relay {
    registry: SessionRegistry,
    outboxes: HashMap<ConnectionId, Outbox>,
}

impl Relay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn connect(&mut self, conn: ConnectionId, outbox: Outbox) {
        info!(%conn, "user connected");
        self.outboxes.insert(conn, outbox);
    }

    pub fn handle(&mut self, conn: ConnectionId, event: ClientEvent) {
        match event {
            ClientEvent::JoinRoom { username, room } => self.join_room(conn, username, room),
            ClientEvent::ChatMessage { text, .. } => self.chat_message(conn, text),
            ClientEvent::Typing => self.typing(conn, true),
            ClientEvent::StopTyping => self.typing(conn, false),
        }
    }

    /// Puts `conn` in `room` under `username` and tells the room, minus the joiner.
    ///
    /// Whatever room `conn` sat in before is left silently.
    pub fn join_room(&mut self, conn: ConnectionId, username: String, room: String) {
        info!(%conn, "{username} joined room: {room}");
        self.registry.join(conn, username.clone(), room.clone());
        self.broadcast_to_room(&room, &ServerEvent::UserJoined(username), Some(conn));
    }

    /// Echoes `text` to the whole room, sender included, stamped with the sender's name.
    pub fn chat_message(&mut self, conn: ConnectionId, text: String) {
        let Some(session) = self.registry.session(conn) else {
            debug!(%conn, "dropping chat message from connection outside any room");
            return;
        };

        let event = ServerEvent::chat(session.display_name.clone(), text);
        self.broadcast_to_room(&session.room, &event, None);
    }

    pub fn typing(&mut self, conn: ConnectionId, typing: bool) {
        let Some(session) = self.registry.session(conn) else {
            debug!(%conn, "dropping typing event from connection outside any room");
            return;
        };

        let name = session.display_name.clone();
        let event = if typing {
            ServerEvent::Typing(name)
        } else {
            ServerEvent::StopTyping(name)
        };
        self.broadcast_to_room(&session.room, &event, Some(conn));
    }

    pub fn disconnect(&mut self, conn: ConnectionId) {
        self.outboxes.remove(&conn);

        match self.registry.remove(conn) {
            Some(session) => {
                info!(%conn, "{} left room: {}", session.display_name, session.room);
                self.broadcast_to_room(&session.room, &ServerEvent::UserLeft(session.display_name), None);
            }
            None => info!(%conn, "user disconnected"),
        }
    }

    pub fn broadcast_to_room(&self, room: &str, event: &ServerEvent, exclude: Option<ConnectionId>) {
        let recipients = self
            .registry
            .members(room)
            .filter(|member| Some(*member) != exclude)
            .filter_map(|member| self.outboxes.get(&member));

        broadcast(recipients, event);
    }
}

#[derive(Debug)]
enum Command {
    Connect { conn: ConnectionId, outbox: Outbox },
    Event { conn: ConnectionId, event: ClientEvent },
    Disconnect { conn: ConnectionId },
}

/// Cheap handle to the relay task.
///
/// The task owns the [`Relay`] and applies commands one at a time, so a join or
/// a fan-out always completes before the next command is looked at.
#[derive(Debug, Clone)]
pub struct RelayHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl RelayHandle {
    /// Spawns the relay task on the current tokio runtime.
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(Relay::new(), rx));
        Self { tx }
    }

    /// Registers `conn` and returns the stream of events addressed to it.
    pub fn connect(&self, conn: ConnectionId) -> mpsc::UnboundedReceiver<ServerEvent> {
        let (outbox, inbox) = mpsc::unbounded_channel();
        self.submit(Command::Connect { conn, outbox });
        inbox
    }

    pub fn send(&self, conn: ConnectionId, event: ClientEvent) {
        self.submit(Command::Event { conn, event });
    }

    pub fn disconnect(&self, conn: ConnectionId) {
        self.submit(Command::Disconnect { conn });
    }

    fn submit(&self, command: Command) {
        if self.tx.send(command).is_err() {
            warn!("relay task has stopped, dropping command");
        }
    }
}

async fn run(mut relay: Relay, mut rx: mpsc::UnboundedReceiver<Command>) {
    while let Some(command) = rx.recv().await {
        match command {
            Command::Connect { conn, outbox } => relay.connect(conn, outbox),
            Command::Event { conn, event } => relay.handle(conn, event),
            Command::Disconnect { conn } => relay.disconnect(conn),
        }
    }
}
