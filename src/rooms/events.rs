use serde::{Deserialize, Serialize};

/// Frames a client sends over the room socket.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    JoinRoom {
        username: String,
        room: String,
    },
    ChatMessage {
        // The relay stamps the registered display name; whatever the client claims is ignored.
        #[serde(default)]
        username: Option<String>,
        text: String,
    },
    Typing,
    StopTyping,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub username: String,
    pub text: String,
}

/// Frames the relay pushes to room members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    UserJoined(String),
    UserLeft(String),
    ChatMessage(ChatMessage),
    Typing(String),
    StopTyping(String),
}

impl ServerEvent {
    pub fn chat(username: impl Into<String>, text: impl Into<String>) -> Self {
        ServerEvent::ChatMessage(ChatMessage {
            username: username.into(),
            text: text.into(),
        })
    }
}
