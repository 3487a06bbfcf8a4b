//! UserRepository trait definition.

use moodhaven_types::error::RepositoryError;
use moodhaven_types::user::User;
use uuid::Uuid;

/// Repository trait for user account persistence.
///
/// Implementations live in moodhaven-infra (e.g., `SqliteUserRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait UserRepository: Send + Sync {
    /// Create a new user.
    ///
    /// Returns `RepositoryError::Conflict` when the username is taken.
    fn create_user(
        &self,
        user: &User,
    ) -> impl std::future::Future<Output = Result<User, RepositoryError>> + Send;

    /// Get a user by id.
    fn get_user(
        &self,
        user_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Get a user by their unique username.
    fn get_user_by_username(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Set the user's streak counter and bump their total check-in count.
    fn update_streak(
        &self,
        user_id: &Uuid,
        streak: u32,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Count registered users.
    fn count_users(&self)
        -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
