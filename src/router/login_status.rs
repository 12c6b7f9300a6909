use axum::Json;
use axum::http::StatusCode;
use serde::Serialize;

use crate::session::AuthSession;
use crate::user::User;

#[derive(Debug, Serialize)]
pub struct Status {
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<User>,
}

/// Report whether the caller's cookie maps to a live session.
pub async fn handler(auth_session: AuthSession) -> (StatusCode, Json<Status>) {
    match auth_session.into_principal() {
        Some(user) => (
            StatusCode::OK,
            Json(Status {
                message: "user logged in",
                user: Some(user),
            }),
        ),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(Status {
                message: "Not authorised",
                user: None,
            }),
        ),
    }
}
