//! Account registration and login.
//!
//! Token issuance and verification are an API-layer concern (the tokens
//! table is queried directly there); this service owns the user records
//! and password handling.

use chrono::Utc;
use moodhaven_types::error::{AuthError, RepositoryError};
use moodhaven_types::user::User;
use tracing::info;
use uuid::Uuid;

use crate::repository::user::UserRepository;
use crate::service::password::PasswordHasher;

/// Minimum accepted password length.
const PASSWORD_MIN_LEN: usize = 8;

/// Handles registration, login, and user lookup.
pub struct AuthService<U: UserRepository, P: PasswordHasher> {
    users: U,
    hasher: P,
}

impl<U: UserRepository, P: PasswordHasher> AuthService<U, P> {
    pub fn new(users: U, hasher: P) -> Self {
        Self { users, hasher }
    }

    /// Access the user repository.
    pub fn user_repo(&self) -> &U {
        &self.users
    }

    /// Register a new account.
    ///
    /// The display name defaults to the username when not provided.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        display_name: Option<String>,
    ) -> Result<User, AuthError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::InvalidUsername(
                "must not be empty".to_string(),
            ));
        }
        if password.len() < PASSWORD_MIN_LEN {
            return Err(AuthError::InvalidPassword(format!(
                "must be at least {PASSWORD_MIN_LEN} characters"
            )));
        }

        if self
            .users
            .get_user_by_username(username)
            .await
            .map_err(storage)?
            .is_some()
        {
            return Err(AuthError::UsernameTaken(username.to_string()));
        }

        let user = User {
            id: Uuid::now_v7(),
            username: username.to_string(),
            password_hash: self.hasher.hash_password(password)?,
            display_name: Some(
                display_name
                    .filter(|name| !name.trim().is_empty())
                    .unwrap_or_else(|| username.to_string()),
            ),
            streak: 0,
            total_check_ins: 0,
            created_at: Utc::now(),
        };

        match self.users.create_user(&user).await {
            Ok(created) => {
                info!(user_id = %created.id, username = %created.username, "User registered");
                Ok(created)
            }
            // Two registrations raced on the same username.
            Err(RepositoryError::Conflict(_)) => {
                Err(AuthError::UsernameTaken(username.to_string()))
            }
            Err(e) => Err(storage(e)),
        }
    }

    /// Verify credentials and return the account.
    ///
    /// Unknown usernames and wrong passwords are indistinguishable to the
    /// caller.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .users
            .get_user_by_username(username.trim())
            .await
            .map_err(storage)?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.hasher.verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(user)
    }

    /// Look up a user by id.
    pub async fn get_user(&self, user_id: &Uuid) -> Result<Option<User>, AuthError> {
        self.users.get_user(user_id).await.map_err(storage)
    }
}

fn storage(e: RepositoryError) -> AuthError {
    AuthError::StorageError(e.to_string())
}
