//! Account creation and credential verification.

use std::sync::Arc;

use sqlx::{Pool, Postgres};

use crate::crypto::PasswordManager;
use crate::error::Result;
use crate::user::{User, UserRepository};

/// Terminal state of a credential check.
///
/// Callers report both negative terminals identically, so a signin failure
/// does not reveal whether the email exists. Data-access errors propagate as
/// `Err` and never collapse into these states.
#[derive(Debug)]
pub enum Verification {
    NoSuchUser,
    PasswordMismatch,
    Verified(User),
}

impl Verification {
    /// The verified user, if verification succeeded.
    pub fn into_verified(self) -> Option<User> {
        match self {
            Self::Verified(user) => Some(user),
            Self::NoSuchUser | Self::PasswordMismatch => None,
        }
    }
}

/// User manager.
#[derive(Clone)]
pub struct AuthService {
    pub repo: UserRepository,
    crypto: Arc<PasswordManager>,
}

impl AuthService {
    /// Create a new [`AuthService`].
    pub fn new(pool: Pool<Postgres>, crypto: Arc<PasswordManager>) -> Self {
        Self {
            repo: UserRepository::new(pool),
            crypto,
        }
    }

    /// Hash the password, then insert the account.
    ///
    /// A hashing failure aborts before any database write.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User> {
        let hash = self.crypto.hash_password(password)?;
        self.repo.insert(name, email, &hash).await
    }

    /// Check credentials against the stored hash.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Verification> {
        let Some(user) = self.repo.find_by_email(email).await? else {
            return Ok(Verification::NoSuchUser);
        };

        if self.crypto.verify_password(password, &user.password) {
            Ok(Verification::Verified(user))
        } else {
            Ok(Verification::PasswordMismatch)
        }
    }

    /// Restore a user from a session-held id.
    ///
    /// A stale id (row removed out-of-band) yields `None` rather than an
    /// error, so the request simply proceeds unauthenticated.
    pub async fn find_by_id(&self, user_id: i32) -> Result<Option<User>> {
        self.repo.find_by_id(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use sqlx::{Pool, Postgres};

    use super::*;
    use crate::error::ServerError;

    fn service(pool: Pool<Postgres>) -> AuthService {
        AuthService::new(pool, Arc::new(crate::crypto::test_manager()))
    }

    #[sqlx::test]
    async fn test_authenticate_terminals(pool: Pool<Postgres>) {
        let auth = service(pool);
        auth.register("Alice", "a@x.com", "pw1").await.unwrap();

        assert!(matches!(
            auth.authenticate("ghost@x.com", "pw1").await.unwrap(),
            Verification::NoSuchUser
        ));
        assert!(matches!(
            auth.authenticate("a@x.com", "wrong").await.unwrap(),
            Verification::PasswordMismatch
        ));

        let user = auth
            .authenticate("a@x.com", "pw1")
            .await
            .unwrap()
            .into_verified()
            .unwrap();
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.name, "Alice");
    }

    #[sqlx::test]
    async fn test_register_duplicate_email(pool: Pool<Postgres>) {
        let auth = service(pool.clone());
        auth.register("Alice", "a@x.com", "pw1").await.unwrap();

        let err = auth.register("Alice 2", "a@x.com", "pw2").await.unwrap_err();
        assert!(matches!(err, ServerError::AlreadyRegistered));

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
                .bind("a@x.com")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count, 1);
    }

    #[sqlx::test]
    async fn test_stored_password_is_a_hash(pool: Pool<Postgres>) {
        let auth = service(pool.clone());
        auth.register("Alice", "a@x.com", "pw1").await.unwrap();

        let stored: String =
            sqlx::query_scalar("SELECT password FROM users WHERE email = $1")
                .bind("a@x.com")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_ne!(stored, "pw1");
        assert!(stored.starts_with("$argon2id$"));
    }
}
