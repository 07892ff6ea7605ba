pub mod events;
pub mod registry;
pub mod relay;
mod ws;

use axum::{routing::get, Router};

use crate::AppState;

pub use events::{ChatMessage, ClientEvent, ServerEvent};
pub use registry::{ConnectionId, Session, SessionRegistry};
pub use relay::{broadcast, Outbox, Relay, RelayHandle};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::room_ws))
}
