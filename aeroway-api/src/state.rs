use std::path::PathBuf;
use std::sync::Arc;

use sqlx::PgPool;

use aeroway_core::repository::{
    AirportRepository, CrewRepository, FleetRepository, FlightRepository, OrderRepository,
    RouteRepository, UserRepository,
};
use aeroway_store::{
    MemStore, PgAirportRepository, PgCrewRepository, PgFleetRepository, PgFlightRepository,
    PgOrderRepository, PgRouteRepository, PgUserRepository,
};

use crate::media::MediaStore;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub airports: Arc<dyn AirportRepository>,
    pub fleet: Arc<dyn FleetRepository>,
    pub crew: Arc<dyn CrewRepository>,
    pub routes: Arc<dyn RouteRepository>,
    pub flights: Arc<dyn FlightRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub users: Arc<dyn UserRepository>,
    pub auth: AuthConfig,
    pub media: Arc<MediaStore>,
}

impl AppState {
    pub fn postgres(pool: PgPool, auth: AuthConfig, media_root: PathBuf) -> Self {
        Self {
            airports: Arc::new(PgAirportRepository::new(pool.clone())),
            fleet: Arc::new(PgFleetRepository::new(pool.clone())),
            crew: Arc::new(PgCrewRepository::new(pool.clone())),
            routes: Arc::new(PgRouteRepository::new(pool.clone())),
            flights: Arc::new(PgFlightRepository::new(pool.clone())),
            orders: Arc::new(PgOrderRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool)),
            auth,
            media: Arc::new(MediaStore::new(media_root)),
        }
    }

    /// All repositories backed by one shared in-memory store.
    pub fn in_memory(auth: AuthConfig, media_root: PathBuf) -> Self {
        let store = Arc::new(MemStore::new());
        Self {
            airports: store.clone(),
            fleet: store.clone(),
            crew: store.clone(),
            routes: store.clone(),
            flights: store.clone(),
            orders: store.clone(),
            users: store,
            auth,
            media: Arc::new(MediaStore::new(media_root)),
        }
    }
}
