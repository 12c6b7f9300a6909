use axum::Json;
use axum::http::StatusCode;

use crate::router::Message;
use crate::session::AuthSession;

/// Invalidate the caller's session.
///
/// Logging out without a live session flushes as a no-op and still reports
/// success; only a session-store failure reports `Logout failed`.
pub async fn handler(auth_session: AuthSession) -> (StatusCode, Json<Message>) {
    match auth_session.logout().await {
        Ok(()) => (
            StatusCode::OK,
            Json(Message {
                message: "Logged out successfully",
            }),
        ),
        Err(err) => {
            tracing::error!(error = %err, "session invalidation failed");

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(Message {
                    message: "Logout failed",
                }),
            )
        },
    }
}
