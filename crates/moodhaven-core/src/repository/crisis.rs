//! CrisisRepository trait definition.

use moodhaven_types::crisis::CrisisAlert;
use moodhaven_types::error::RepositoryError;

/// Repository trait for crisis alert persistence.
///
/// This subsystem only creates alerts; resolution happens out-of-band.
pub trait CrisisRepository: Send + Sync {
    /// Record a new crisis alert.
    fn create_alert(
        &self,
        alert: &CrisisAlert,
    ) -> impl std::future::Future<Output = Result<CrisisAlert, RepositoryError>> + Send;
}
