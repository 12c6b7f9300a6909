//! HTTP route handlers.

pub mod login_status;
pub mod logout;
pub mod profile;
pub mod signin;
pub mod signup;

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::Serialize;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ServerError;

/// Single-message JSON body shared by the session-gated routes.
#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}

/// JSON extractor that runs `validator` rules before the handler.
pub struct Valid<T>(pub T);

impl<T, S> FromRequest<S> for Valid<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(
        req: Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;

        Ok(Self(value))
    }
}

/// Build an [`crate::AppState`] over a test pool.
#[cfg(test)]
pub(crate) async fn state(
    pool: sqlx::Pool<sqlx::Postgres>,
) -> crate::AppState {
    use std::sync::Arc;

    use tower_sessions::cookie::Key;
    use tower_sessions_sqlx_store::PostgresStore;

    let session_store = PostgresStore::new(pool.clone());
    session_store.migrate().await.expect("session store migration");

    crate::AppState {
        config: Arc::new(crate::config::Configuration::default()),
        db: crate::database::Database {
            postgres: pool.clone(),
        },
        auth: crate::user::AuthService::new(
            pool,
            Arc::new(crate::crypto::test_manager()),
        ),
        session_store,
        cookie_key: Key::from(&[0u8; 64]),
    }
}
