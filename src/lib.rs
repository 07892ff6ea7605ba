pub mod auth;
pub mod config;
pub mod index;
pub mod rooms;

use std::sync::Arc;

use axum::{extract::FromRef, http::StatusCode, response::{IntoResponse, Response}, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use config::Config;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub users: Arc<dyn auth::UserStore>,
    pub relay: rooms::RelayHandle,
}

impl AppState {
    /// Fresh in-memory user store and a newly spawned relay task.
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(auth::MemoryUserStore::new()),
            relay: rooms::RelayHandle::spawn(),
        }
    }
}

pub fn app(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(index::index))
        .merge(auth::router())
        .merge(rooms::router())
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub type AppResult<T> = Result<T, AppError>;
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("request failed: {:#}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;

    #[tokio::test]
    async fn app_error_is_a_bare_500() {
        let response = AppError(anyhow!("store unavailable")).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"store unavailable");
    }
}
