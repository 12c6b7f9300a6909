//! Cookie-session principal handling.
//!
//! The serialized session payload holds only the user id; display fields
//! are re-fetched from the users table whenever a request restores its
//! principal, so the stored hash never rides along in session state.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use tower_sessions::Session;

use crate::AppState;
use crate::error::{Result, ServerError};
use crate::user::User;

/// Session key holding the authenticated user's id.
pub const PRINCIPAL_KEY: &str = "user_id";

/// Per-request authentication context.
///
/// Built by an extractor, so handlers receive an explicit value instead of
/// probing ambient request state.
pub struct AuthSession {
    session: Session,
    principal: Option<User>,
}

impl AuthSession {
    /// Whether a principal was restored from the session cookie.
    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    /// The restored principal, if any.
    pub fn principal(&self) -> Option<&User> {
        self.principal.as_ref()
    }

    /// Consume the context, yielding the restored principal.
    pub fn into_principal(self) -> Option<User> {
        self.principal
    }

    /// Establish a session for `user`.
    ///
    /// The session id is cycled first so a cookie issued before signin
    /// cannot be fixed onto the authenticated session.
    pub async fn login(&self, user: &User) -> Result<()> {
        self.session.cycle_id().await?;
        self.session.insert(PRINCIPAL_KEY, user.id).await?;

        Ok(())
    }

    /// Invalidate the session: delete the store record and unset the cookie.
    ///
    /// Flushing an already-empty session is a successful no-op; only a
    /// store-backend failure is an error.
    pub async fn logout(self) -> Result<()> {
        self.session.flush().await?;

        Ok(())
    }
}

impl<S> FromRequestParts<S> for AuthSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, message)| ServerError::Internal(message.to_owned()))?;

        let principal = match session.get::<i32>(PRINCIPAL_KEY).await? {
            Some(id) => AppState::from_ref(state).auth.find_by_id(id).await?,
            None => None,
        };

        Ok(Self { session, principal })
    }
}
