use async_trait::async_trait;
use thiserror::Error;

use crate::filters::{AirplaneFilter, CrewFilter, NameFilter, OrderFilter, RouteFilter, RouteNameFilter};
use crate::models::{
    Airplane, AirplaneType, AirplaneWithType, Airport, Crew, Flight, FlightRecord, NewAirplane,
    NewAirplaneType, NewAirport, NewCrew, NewFlight, NewRoute, NewTicket, NewUser, OrderRecord,
    Route, RouteDetail, TicketRecord, User,
};
use crate::validation::ValidationError;

/// Failures a repository can surface. Conflicts (duplicate seat, duplicate
/// email) are kept distinct from validation failures so the API layer can map
/// them to different status codes.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("storage error: {0}")]
    Storage(String),
}

impl RepoError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        RepoError::NotFound { entity, id }
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

#[async_trait]
pub trait AirportRepository: Send + Sync {
    async fn create(&self, airport: NewAirport) -> RepoResult<Airport>;
    async fn get(&self, id: i64) -> RepoResult<Airport>;
    async fn list(&self, filter: &NameFilter) -> RepoResult<Vec<Airport>>;
    async fn update(&self, id: i64, airport: NewAirport) -> RepoResult<Airport>;
    async fn delete(&self, id: i64) -> RepoResult<()>;
    async fn set_image(&self, id: i64, path: &str) -> RepoResult<Airport>;
}

/// Airplane types and airplanes together; an airplane never exists without
/// its type.
#[async_trait]
pub trait FleetRepository: Send + Sync {
    async fn create_airplane_type(&self, airplane_type: NewAirplaneType)
        -> RepoResult<AirplaneType>;
    async fn get_airplane_type(&self, id: i64) -> RepoResult<AirplaneType>;
    async fn list_airplane_types(&self, filter: &NameFilter) -> RepoResult<Vec<AirplaneType>>;
    async fn update_airplane_type(
        &self,
        id: i64,
        airplane_type: NewAirplaneType,
    ) -> RepoResult<AirplaneType>;
    async fn delete_airplane_type(&self, id: i64) -> RepoResult<()>;

    async fn create_airplane(&self, airplane: NewAirplane) -> RepoResult<Airplane>;
    async fn get_airplane(&self, id: i64) -> RepoResult<AirplaneWithType>;
    async fn list_airplanes(&self, filter: &AirplaneFilter) -> RepoResult<Vec<AirplaneWithType>>;
    async fn update_airplane(&self, id: i64, airplane: NewAirplane) -> RepoResult<Airplane>;
    async fn delete_airplane(&self, id: i64) -> RepoResult<()>;
    async fn set_airplane_image(&self, id: i64, path: &str) -> RepoResult<Airplane>;
}

#[async_trait]
pub trait CrewRepository: Send + Sync {
    async fn create(&self, crew: NewCrew) -> RepoResult<Crew>;
    async fn get(&self, id: i64) -> RepoResult<Crew>;
    async fn list(&self, filter: &CrewFilter) -> RepoResult<Vec<Crew>>;
    async fn update(&self, id: i64, crew: NewCrew) -> RepoResult<Crew>;
    async fn delete(&self, id: i64) -> RepoResult<()>;
}

#[async_trait]
pub trait RouteRepository: Send + Sync {
    async fn create(&self, route: NewRoute) -> RepoResult<Route>;
    async fn get(&self, id: i64) -> RepoResult<RouteDetail>;
    async fn list(&self, filter: &RouteFilter) -> RepoResult<Vec<RouteDetail>>;
    async fn update(&self, id: i64, route: NewRoute) -> RepoResult<Route>;
}

/// Flights plus the read-only tickets collection, whose shapes are flight
/// projections.
#[async_trait]
pub trait FlightRepository: Send + Sync {
    async fn create(&self, flight: NewFlight) -> RepoResult<Flight>;
    async fn get(&self, id: i64) -> RepoResult<FlightRecord>;
    /// Listing is ordered by ascending free seats.
    async fn list(&self, filter: &RouteNameFilter) -> RepoResult<Vec<FlightRecord>>;
    async fn update(&self, id: i64, flight: NewFlight) -> RepoResult<Flight>;

    async fn get_ticket(&self, id: i64) -> RepoResult<TicketRecord>;
    async fn list_tickets(&self, filter: &RouteNameFilter) -> RepoResult<Vec<TicketRecord>>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Creates the order and all of its tickets atomically. Any seat-range
    /// failure or duplicate-seat conflict leaves nothing behind.
    async fn create(&self, user_id: i64, tickets: Vec<NewTicket>) -> RepoResult<OrderRecord>;
    async fn get(&self, user_id: i64, id: i64) -> RepoResult<OrderRecord>;
    async fn list(&self, user_id: i64, filter: &OrderFilter) -> RepoResult<Vec<OrderRecord>>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> RepoResult<User>;
    async fn get(&self, id: i64) -> RepoResult<User>;
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
}
