use thiserror::Error;

/// Errors from repository operations (used by trait definitions in moodhaven-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors related to account registration, login, and lookup.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("invalid username: {0}")]
    InvalidUsername(String),

    #[error("invalid password: {0}")]
    InvalidPassword(String),

    #[error("password hashing failed")]
    HashingFailed,

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors related to chat session lifecycle and message access.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat session not found")]
    SessionNotFound,

    #[error("chat session has ended")]
    SessionClosed,

    #[error("not a participant of this session")]
    Forbidden,

    #[error("storage error: {0}")]
    StorageError(String),
}

impl From<RepositoryError> for ChatError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => ChatError::SessionNotFound,
            other => ChatError::StorageError(other.to_string()),
        }
    }
}

/// Errors related to mood check-ins and the gamification rules.
#[derive(Debug, Error)]
pub enum WellnessError {
    #[error("mood level must be between 1 and 10, got {0}")]
    InvalidMoodLevel(i32),

    #[error("user not found")]
    UserNotFound,

    #[error("storage error: {0}")]
    StorageError(String),
}

impl From<RepositoryError> for WellnessError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => WellnessError::UserNotFound,
            other => WellnessError::StorageError(other.to_string()),
        }
    }
}

/// Errors the message relay reports back over the realtime channel.
///
/// Every variant is terminal only for the offending frame: the relay
/// reports it to the originating connection and keeps the connection open.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("invalid message format")]
    MalformedPayload,

    #[error("{0}")]
    Validation(String),

    #[error("failed to save message: {0}")]
    Persistence(String),
}
