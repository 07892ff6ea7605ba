use std::sync::Arc;

use axum::{debug_handler, extract::{rejection::JsonRejection, State}, http::StatusCode, response::Response, Json};

use crate::AppResult;

use super::{reply, Credentials, UserStore};

/// Checks the pair against the store. Nothing is issued on success; chatting
/// does not depend on having logged in.
#[debug_handler(state = crate::AppState)]
pub async fn login(
    State(users): State<Arc<dyn UserStore>>,
    credentials: Result<Json<Credentials>, JsonRejection>,
) -> AppResult<Response> {
    // Unparseable bodies count as missing credentials.
    let Credentials { username, password } = credentials.map(|Json(c)| c).unwrap_or_default();
    let (Some(username), Some(password)) = (username, password) else {
        return Ok(reply(StatusCode::BAD_REQUEST, "Invalid username or password"));
    };

    match users.get(&username).await? {
        Some(stored) if stored == password => Ok(reply(StatusCode::OK, "Login successful")),
        _ => Ok(reply(StatusCode::BAD_REQUEST, "Invalid username or password")),
    }
}
