use std::sync::Arc;

use axum::{debug_handler, extract::{rejection::JsonRejection, State}, http::StatusCode, response::Response, Json};
use tracing::info;

use crate::AppResult;

use super::{reply, Credentials, UserStore};

#[debug_handler(state = crate::AppState)]
pub async fn register(
    State(users): State<Arc<dyn UserStore>>,
    credentials: Result<Json<Credentials>, JsonRejection>,
) -> AppResult<Response> {
    let Some((username, password)) = credentials.ok().and_then(|Json(c)| c.filled()) else {
        return Ok(reply(StatusCode::BAD_REQUEST, "Username and password required"));
    };

    if !users.create(&username, &password).await? {
        return Ok(reply(StatusCode::BAD_REQUEST, "Username already exists"));
    }

    info!("registered {username}");
    Ok(reply(StatusCode::OK, "Registered successfully"))
}
