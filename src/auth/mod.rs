mod login;
mod register;
mod store;

use axum::{http::StatusCode, response::{IntoResponse, Response}, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::AppState;

pub use login::login;
pub use register::register;
pub use store::{MemoryUserStore, UserStore};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Body of `/register` and `/login`. Both fields may be absent; handlers decide what that means.
#[derive(Debug, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Credentials {
    /// Both fields, if both are present and non-empty.
    fn filled(self) -> Option<(String, String)> {
        match (self.username, self.password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some((username, password))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
struct Reply {
    msg: &'static str,
}

fn reply(status: StatusCode, msg: &'static str) -> Response {
    (status, Json(Reply { msg })).into_response()
}
