use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Reference data
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Airport {
    pub id: i64,
    pub name: String,
    pub closest_big_city: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAirport {
    pub name: String,
    pub closest_big_city: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AirplaneType {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAirplaneType {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Airplane {
    pub id: i64,
    pub name: String,
    pub rows: i32,
    pub seats_in_rows: i32,
    pub airplane_type_id: i64,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAirplane {
    pub name: String,
    pub rows: i32,
    pub seats_in_rows: i32,
    pub airplane_type: i64,
}

/// Airplane joined with its type, the shape list/detail reads work from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirplaneWithType {
    pub airplane: Airplane,
    pub airplane_type: AirplaneType,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Crew {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCrew {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Route {
    pub id: i64,
    pub source_id: i64,
    pub destination_id: i64,
    pub distance: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRoute {
    pub source: i64,
    pub destination: i64,
    pub distance: i32,
}

/// Route joined with both of its airports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDetail {
    pub route: Route,
    pub source: Airport,
    pub destination: Airport,
}

impl RouteDetail {
    pub fn route_name(&self) -> String {
        route_display_name(&self.source.name, &self.destination.name)
    }
}

// ============================================================================
// Flights and tickets
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Flight {
    pub id: i64,
    pub route_id: i64,
    pub airplane_id: i64,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewFlight {
    pub route: i64,
    pub airplane: i64,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    #[serde(default)]
    pub crew: Vec<i64>,
}

/// A sold seat on a flight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatRef {
    pub row: i32,
    pub seat: i32,
}

/// Flight joined with everything its read shapes need: route (with airports),
/// airplane (with type), crew, and the seats already taken.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightRecord {
    pub flight: Flight,
    pub route: RouteDetail,
    pub airplane: AirplaneWithType,
    pub crew: Vec<Crew>,
    pub taken_seats: Vec<SeatRef>,
}

impl FlightRecord {
    pub fn free_seats(&self) -> i64 {
        free_seats(
            self.airplane.airplane.rows,
            self.airplane.airplane.seats_in_rows,
            self.taken_seats.len() as i64,
        )
    }

    pub fn route_name(&self) -> String {
        self.route.route_name()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ticket {
    pub id: i64,
    pub row: i32,
    pub seat: i32,
    pub flight_id: i64,
    pub order_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTicket {
    pub row: i32,
    pub seat: i32,
    pub flight: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketRecord {
    pub ticket: Ticket,
    pub flight: FlightRecord,
}

// ============================================================================
// Orders and users
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order: Order,
    pub tickets: Vec<TicketRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub is_staff: bool,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub is_staff: bool,
}

// ============================================================================
// Derived projections
// ============================================================================

/// Display form of a route, also the haystack for "route" filters.
pub fn route_display_name(source: &str, destination: &str) -> String {
    format!("{} - {}", source, destination)
}

/// Seats an airplane offers in total.
pub fn capacity(rows: i32, seats_in_rows: i32) -> i64 {
    i64::from(rows) * i64::from(seats_in_rows)
}

/// Seats still available on a flight. Computed at read time, never stored.
pub fn free_seats(rows: i32, seats_in_rows: i32, ticket_count: i64) -> i64 {
    capacity(rows, seats_in_rows) - ticket_count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_display_name_uses_hyphen_separator() {
        assert_eq!(
            route_display_name("Paris", "Tokyo Airport"),
            "Paris - Tokyo Airport"
        );
    }

    #[test]
    fn capacity_is_rows_times_seats() {
        assert_eq!(capacity(10, 6), 60);
    }

    #[test]
    fn free_seats_subtracts_ticket_count() {
        assert_eq!(free_seats(10, 6, 0), 60);
        assert_eq!(free_seats(10, 6, 1), 59);
        assert_eq!(free_seats(10, 6, 60), 0);
    }
}
