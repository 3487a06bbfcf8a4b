//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by the HTTP and
//! realtime layers. Services are generic over repository traits, but
//! AppState pins them to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use moodhaven_core::chat::service::ChatService;
use moodhaven_core::relay::registry::ConnectionRegistry;
use moodhaven_core::relay::service::MessageRelay;
use moodhaven_core::relay::BroadcastScope;
use moodhaven_core::service::auth::AuthService;
use moodhaven_core::service::wellness::WellnessService;
use moodhaven_infra::crypto::password::Argon2PasswordHasher;
use moodhaven_infra::sqlite::achievement::SqliteAchievementRepository;
use moodhaven_infra::sqlite::chat::SqliteChatRepository;
use moodhaven_infra::sqlite::crisis::SqliteCrisisRepository;
use moodhaven_infra::sqlite::mood::SqliteMoodRepository;
use moodhaven_infra::sqlite::pool::{resolve_data_dir, DatabasePool};
use moodhaven_infra::sqlite::user::SqliteUserRepository;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteAuthService = AuthService<SqliteUserRepository, Argon2PasswordHasher>;

pub type ConcreteChatService = ChatService<SqliteChatRepository>;

pub type ConcreteWellnessService = WellnessService<
    SqliteMoodRepository,
    SqliteUserRepository,
    SqliteAchievementRepository,
    SqliteCrisisRepository,
>;

pub type ConcreteRelay = MessageRelay<SqliteChatRepository>;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<ConcreteAuthService>,
    pub chat_service: Arc<ConcreteChatService>,
    pub wellness_service: Arc<ConcreteWellnessService>,
    pub relay: Arc<ConcreteRelay>,
    pub registry: Arc<ConnectionRegistry>,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: connect to DB, wire services.
    pub async fn init(broadcast_scope: BroadcastScope) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        // Initialize database
        let db_url = format!(
            "sqlite://{}?mode=rwc",
            data_dir.join("moodhaven.db").display()
        );
        let db_pool = DatabasePool::new(&db_url).await?;

        // Wire auth service
        let auth_service = AuthService::new(
            SqliteUserRepository::new(db_pool.clone()),
            Argon2PasswordHasher::new(),
        );

        // Wire wellness service with its repositories
        let wellness_service = WellnessService::new(
            SqliteMoodRepository::new(db_pool.clone()),
            SqliteUserRepository::new(db_pool.clone()),
            SqliteAchievementRepository::new(db_pool.clone()),
            SqliteCrisisRepository::new(db_pool.clone()),
        );

        // Wire chat service and the relay around it. The registry is an
        // owned instance here, passed into the relay -- never a global.
        let chat_service = Arc::new(ChatService::new(SqliteChatRepository::new(db_pool.clone())));
        let registry = Arc::new(ConnectionRegistry::new());
        let relay = MessageRelay::new(chat_service.clone(), registry.clone(), broadcast_scope);

        Ok(Self {
            auth_service: Arc::new(auth_service),
            chat_service,
            wellness_service: Arc::new(wellness_service),
            relay: Arc::new(relay),
            registry,
            data_dir,
            db_pool,
        })
    }
}
