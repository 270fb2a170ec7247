//! Application state wiring all services together.
//!
//! Services are generic over repository/storage/clock traits, but AppState
//! pins them to the concrete infra implementations.

use std::path::PathBuf;

use questline_core::clock::SystemClock;
use questline_core::service::booking::BookingService;
use questline_core::service::query::QueryService;
use questline_core::service::registry::RegistryService;
use questline_infra::config::{load_config, resolve_data_dir};
use questline_infra::sqlite::character::SqliteCharacterRepository;
use questline_infra::sqlite::location::SqliteLocationRepository;
use questline_infra::sqlite::pool::DatabasePool;
use questline_infra::sqlite::storage::SqliteStorage;
use questline_infra::sqlite::user::SqliteUserRepository;

/// Concrete type aliases for the service generics pinned to infra
/// implementations.
pub type ConcreteBookingService = BookingService<SqliteStorage, SystemClock>;

pub type ConcreteQueryService = QueryService<
    SqliteCharacterRepository,
    SqliteLocationRepository,
    SqliteUserRepository,
    SystemClock,
>;

pub type ConcreteRegistryService =
    RegistryService<SqliteCharacterRepository, SqliteLocationRepository, SqliteUserRepository>;

/// Shared application state holding all services.
pub struct AppState {
    pub booking: ConcreteBookingService,
    pub query: ConcreteQueryService,
    pub registry: ConcreteRegistryService,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state: connect to the database, wire
    /// services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_config(&data_dir).await;
        let pool = DatabasePool::new(&config.database_url(&data_dir)).await?;

        let factory = config.engine.factory()?;

        let booking = BookingService::new(
            SqliteStorage::new(pool.clone()),
            SystemClock,
            factory,
            config.engine.instruction_duration(),
        );

        let query = QueryService::new(
            SqliteCharacterRepository::new(pool.clone()),
            SqliteLocationRepository::new(pool.clone()),
            SqliteUserRepository::new(pool.clone()),
            SystemClock,
            factory,
        );

        let registry = RegistryService::new(
            SqliteCharacterRepository::new(pool.clone()),
            SqliteLocationRepository::new(pool.clone()),
            SqliteUserRepository::new(pool),
        );

        Ok(Self {
            booking,
            query,
            registry,
            data_dir,
        })
    }
}
