//! AchievementRepository trait definition.

use moodhaven_types::achievement::Achievement;
use moodhaven_types::error::RepositoryError;
use uuid::Uuid;

/// Repository trait for achievement persistence.
pub trait AchievementRepository: Send + Sync {
    /// Record a newly-unlocked achievement.
    fn create_achievement(
        &self,
        achievement: &Achievement,
    ) -> impl std::future::Future<Output = Result<Achievement, RepositoryError>> + Send;

    /// A user's achievements, newest first.
    fn achievements_for_user(
        &self,
        user_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<Achievement>, RepositoryError>> + Send;
}
