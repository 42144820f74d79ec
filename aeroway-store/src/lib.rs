pub mod app_config;
pub mod catalog_repo;
pub mod database;
pub mod flight_repo;
pub mod memory;
pub mod order_repo;
pub mod user_repo;

pub use catalog_repo::{
    PgAirportRepository, PgCrewRepository, PgFleetRepository, PgRouteRepository,
};
pub use database::DbClient;
pub use flight_repo::PgFlightRepository;
pub use memory::MemStore;
pub use order_repo::PgOrderRepository;
pub use user_repo::PgUserRepository;

use aeroway_core::repository::RepoError;

/// Maps sqlx failures onto the repository error taxonomy. Unique-index
/// violations (duplicate seat per flight, duplicate user email) become
/// conflicts; everything else is a storage failure.
pub(crate) fn map_sqlx_err(err: sqlx::Error) -> RepoError {
    match &err {
        sqlx::Error::Database(db)
            if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
        {
            RepoError::Conflict(db.message().to_string())
        }
        _ => RepoError::Storage(err.to_string()),
    }
}
