//! In-memory implementation of every repository trait, semantically matched
//! to the Postgres repositories. Used by the API integration tests and for
//! running locally without a database.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use aeroway_core::filters::{
    icontains, AirplaneFilter, CrewFilter, NameFilter, OrderFilter, RouteFilter, RouteNameFilter,
};
use aeroway_core::models::{
    Airplane, AirplaneType, AirplaneWithType, Airport, Crew, Flight, FlightRecord, NewAirplane,
    NewAirplaneType, NewAirport, NewCrew, NewFlight, NewRoute, NewTicket, NewUser, Order,
    OrderRecord, Route, RouteDetail, SeatRef, Ticket, TicketRecord, User,
};
use aeroway_core::repository::{
    AirportRepository, CrewRepository, FleetRepository, FlightRepository, OrderRepository,
    RepoError, RepoResult, RouteRepository, UserRepository,
};
use aeroway_core::validation::validate_ticket;

#[derive(Default)]
struct Tables {
    next_id: i64,
    airports: HashMap<i64, Airport>,
    airplane_types: HashMap<i64, AirplaneType>,
    airplanes: HashMap<i64, Airplane>,
    crew: HashMap<i64, Crew>,
    routes: HashMap<i64, Route>,
    flights: HashMap<i64, Flight>,
    flight_crew: HashMap<i64, Vec<i64>>,
    orders: HashMap<i64, Order>,
    tickets: HashMap<i64, Ticket>,
    users: HashMap<i64, User>,
}

impl Tables {
    fn next(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn route_detail(&self, id: i64) -> RepoResult<RouteDetail> {
        let route = self
            .routes
            .get(&id)
            .cloned()
            .ok_or_else(|| RepoError::not_found("route", id))?;
        let source = self
            .airports
            .get(&route.source_id)
            .cloned()
            .ok_or_else(|| RepoError::not_found("airport", route.source_id))?;
        let destination = self
            .airports
            .get(&route.destination_id)
            .cloned()
            .ok_or_else(|| RepoError::not_found("airport", route.destination_id))?;
        Ok(RouteDetail {
            route,
            source,
            destination,
        })
    }

    fn airplane_with_type(&self, id: i64) -> RepoResult<AirplaneWithType> {
        let airplane = self
            .airplanes
            .get(&id)
            .cloned()
            .ok_or_else(|| RepoError::not_found("airplane", id))?;
        let airplane_type = self
            .airplane_types
            .get(&airplane.airplane_type_id)
            .cloned()
            .ok_or_else(|| RepoError::not_found("airplane type", airplane.airplane_type_id))?;
        Ok(AirplaneWithType {
            airplane,
            airplane_type,
        })
    }

    fn flight_record(&self, id: i64) -> RepoResult<FlightRecord> {
        let flight = self
            .flights
            .get(&id)
            .cloned()
            .ok_or_else(|| RepoError::not_found("flight", id))?;
        let route = self.route_detail(flight.route_id)?;
        let airplane = self.airplane_with_type(flight.airplane_id)?;

        let mut crew: Vec<Crew> = self
            .flight_crew
            .get(&id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|crew_id| self.crew.get(crew_id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        crew.sort_by_key(|c| c.id);

        let mut taken_seats: Vec<SeatRef> = self
            .tickets
            .values()
            .filter(|t| t.flight_id == id)
            .map(|t| SeatRef {
                row: t.row,
                seat: t.seat,
            })
            .collect();
        taken_seats.sort_by_key(|s| (s.row, s.seat));

        Ok(FlightRecord {
            flight,
            route,
            airplane,
            crew,
            taken_seats,
        })
    }

    fn ticket_record(&self, id: i64) -> RepoResult<TicketRecord> {
        let ticket = self
            .tickets
            .get(&id)
            .cloned()
            .ok_or_else(|| RepoError::not_found("ticket", id))?;
        let flight = self.flight_record(ticket.flight_id)?;
        Ok(TicketRecord { ticket, flight })
    }

    fn order_record(&self, order: Order) -> RepoResult<OrderRecord> {
        let mut ticket_ids: Vec<i64> = self
            .tickets
            .values()
            .filter(|t| t.order_id == order.id)
            .map(|t| t.id)
            .collect();
        ticket_ids.sort_unstable();

        let mut tickets = Vec::with_capacity(ticket_ids.len());
        for ticket_id in ticket_ids {
            tickets.push(self.ticket_record(ticket_id)?);
        }
        Ok(OrderRecord { order, tickets })
    }

    // Cascade helpers, mirroring the foreign keys in the schema.

    fn remove_flight(&mut self, id: i64) {
        self.flights.remove(&id);
        self.flight_crew.remove(&id);
        self.tickets.retain(|_, t| t.flight_id != id);
    }

    fn remove_route(&mut self, id: i64) {
        self.routes.remove(&id);
        let flight_ids: Vec<i64> = self
            .flights
            .values()
            .filter(|f| f.route_id == id)
            .map(|f| f.id)
            .collect();
        for flight_id in flight_ids {
            self.remove_flight(flight_id);
        }
    }

    fn remove_airplane(&mut self, id: i64) {
        self.airplanes.remove(&id);
        let flight_ids: Vec<i64> = self
            .flights
            .values()
            .filter(|f| f.airplane_id == id)
            .map(|f| f.id)
            .collect();
        for flight_id in flight_ids {
            self.remove_flight(flight_id);
        }
    }
}

pub struct MemStore {
    tables: RwLock<Tables>,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AirportRepository for MemStore {
    async fn create(&self, airport: NewAirport) -> RepoResult<Airport> {
        let mut tables = self.write();
        let id = tables.next();
        let record = Airport {
            id,
            name: airport.name,
            closest_big_city: airport.closest_big_city,
            image: None,
        };
        tables.airports.insert(id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: i64) -> RepoResult<Airport> {
        self.read()
            .airports
            .get(&id)
            .cloned()
            .ok_or_else(|| RepoError::not_found("airport", id))
    }

    async fn list(&self, filter: &NameFilter) -> RepoResult<Vec<Airport>> {
        let tables = self.read();
        let mut airports: Vec<Airport> = tables
            .airports
            .values()
            .filter(|a| {
                filter
                    .name
                    .as_deref()
                    .map_or(true, |name| icontains(&a.name, name))
            })
            .cloned()
            .collect();
        airports.sort_by_key(|a| a.id);
        Ok(airports)
    }

    async fn update(&self, id: i64, airport: NewAirport) -> RepoResult<Airport> {
        let mut tables = self.write();
        let record = tables
            .airports
            .get_mut(&id)
            .ok_or_else(|| RepoError::not_found("airport", id))?;
        record.name = airport.name;
        record.closest_big_city = airport.closest_big_city;
        Ok(record.clone())
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        let mut tables = self.write();
        if tables.airports.remove(&id).is_none() {
            return Err(RepoError::not_found("airport", id));
        }
        let route_ids: Vec<i64> = tables
            .routes
            .values()
            .filter(|r| r.source_id == id || r.destination_id == id)
            .map(|r| r.id)
            .collect();
        for route_id in route_ids {
            tables.remove_route(route_id);
        }
        Ok(())
    }

    async fn set_image(&self, id: i64, path: &str) -> RepoResult<Airport> {
        let mut tables = self.write();
        let record = tables
            .airports
            .get_mut(&id)
            .ok_or_else(|| RepoError::not_found("airport", id))?;
        record.image = Some(path.to_string());
        Ok(record.clone())
    }
}

#[async_trait]
impl FleetRepository for MemStore {
    async fn create_airplane_type(
        &self,
        airplane_type: NewAirplaneType,
    ) -> RepoResult<AirplaneType> {
        let mut tables = self.write();
        let id = tables.next();
        let record = AirplaneType {
            id,
            name: airplane_type.name,
        };
        tables.airplane_types.insert(id, record.clone());
        Ok(record)
    }

    async fn get_airplane_type(&self, id: i64) -> RepoResult<AirplaneType> {
        self.read()
            .airplane_types
            .get(&id)
            .cloned()
            .ok_or_else(|| RepoError::not_found("airplane type", id))
    }

    async fn list_airplane_types(&self, filter: &NameFilter) -> RepoResult<Vec<AirplaneType>> {
        let tables = self.read();
        let mut types: Vec<AirplaneType> = tables
            .airplane_types
            .values()
            .filter(|t| {
                filter
                    .name
                    .as_deref()
                    .map_or(true, |name| icontains(&t.name, name))
            })
            .cloned()
            .collect();
        types.sort_by_key(|t| t.id);
        Ok(types)
    }

    async fn update_airplane_type(
        &self,
        id: i64,
        airplane_type: NewAirplaneType,
    ) -> RepoResult<AirplaneType> {
        let mut tables = self.write();
        let record = tables
            .airplane_types
            .get_mut(&id)
            .ok_or_else(|| RepoError::not_found("airplane type", id))?;
        record.name = airplane_type.name;
        Ok(record.clone())
    }

    async fn delete_airplane_type(&self, id: i64) -> RepoResult<()> {
        let mut tables = self.write();
        if tables.airplane_types.remove(&id).is_none() {
            return Err(RepoError::not_found("airplane type", id));
        }
        let airplane_ids: Vec<i64> = tables
            .airplanes
            .values()
            .filter(|a| a.airplane_type_id == id)
            .map(|a| a.id)
            .collect();
        for airplane_id in airplane_ids {
            tables.remove_airplane(airplane_id);
        }
        Ok(())
    }

    async fn create_airplane(&self, airplane: NewAirplane) -> RepoResult<Airplane> {
        let mut tables = self.write();
        if !tables.airplane_types.contains_key(&airplane.airplane_type) {
            return Err(RepoError::not_found("airplane type", airplane.airplane_type));
        }
        let id = tables.next();
        let record = Airplane {
            id,
            name: airplane.name,
            rows: airplane.rows,
            seats_in_rows: airplane.seats_in_rows,
            airplane_type_id: airplane.airplane_type,
            image: None,
        };
        tables.airplanes.insert(id, record.clone());
        Ok(record)
    }

    async fn get_airplane(&self, id: i64) -> RepoResult<AirplaneWithType> {
        self.read().airplane_with_type(id)
    }

    async fn list_airplanes(&self, filter: &AirplaneFilter) -> RepoResult<Vec<AirplaneWithType>> {
        let tables = self.read();
        let mut ids: Vec<i64> = tables
            .airplanes
            .values()
            .filter(|a| {
                filter
                    .name
                    .as_deref()
                    .map_or(true, |name| icontains(&a.name, name))
            })
            .filter(|a| {
                filter
                    .airplane_type
                    .as_deref()
                    .map_or(true, |type_ids| type_ids.contains(&a.airplane_type_id))
            })
            .map(|a| a.id)
            .collect();
        ids.sort_unstable();

        let mut airplanes = Vec::with_capacity(ids.len());
        for id in ids {
            airplanes.push(tables.airplane_with_type(id)?);
        }
        Ok(airplanes)
    }

    async fn update_airplane(&self, id: i64, airplane: NewAirplane) -> RepoResult<Airplane> {
        let mut tables = self.write();
        if !tables.airplane_types.contains_key(&airplane.airplane_type) {
            return Err(RepoError::not_found("airplane type", airplane.airplane_type));
        }
        let record = tables
            .airplanes
            .get_mut(&id)
            .ok_or_else(|| RepoError::not_found("airplane", id))?;
        record.name = airplane.name;
        record.rows = airplane.rows;
        record.seats_in_rows = airplane.seats_in_rows;
        record.airplane_type_id = airplane.airplane_type;
        Ok(record.clone())
    }

    async fn delete_airplane(&self, id: i64) -> RepoResult<()> {
        let mut tables = self.write();
        if !tables.airplanes.contains_key(&id) {
            return Err(RepoError::not_found("airplane", id));
        }
        tables.remove_airplane(id);
        Ok(())
    }

    async fn set_airplane_image(&self, id: i64, path: &str) -> RepoResult<Airplane> {
        let mut tables = self.write();
        let record = tables
            .airplanes
            .get_mut(&id)
            .ok_or_else(|| RepoError::not_found("airplane", id))?;
        record.image = Some(path.to_string());
        Ok(record.clone())
    }
}

#[async_trait]
impl CrewRepository for MemStore {
    async fn create(&self, crew: NewCrew) -> RepoResult<Crew> {
        let mut tables = self.write();
        let id = tables.next();
        let record = Crew {
            id,
            first_name: crew.first_name,
            last_name: crew.last_name,
        };
        tables.crew.insert(id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: i64) -> RepoResult<Crew> {
        self.read()
            .crew
            .get(&id)
            .cloned()
            .ok_or_else(|| RepoError::not_found("crew", id))
    }

    async fn list(&self, filter: &CrewFilter) -> RepoResult<Vec<Crew>> {
        let tables = self.read();
        let mut crew: Vec<Crew> = tables
            .crew
            .values()
            .filter(|c| {
                filter
                    .first_name
                    .as_deref()
                    .map_or(true, |name| icontains(&c.first_name, name))
            })
            .filter(|c| {
                filter
                    .last_name
                    .as_deref()
                    .map_or(true, |name| icontains(&c.last_name, name))
            })
            .cloned()
            .collect();
        crew.sort_by_key(|c| c.id);
        Ok(crew)
    }

    async fn update(&self, id: i64, crew: NewCrew) -> RepoResult<Crew> {
        let mut tables = self.write();
        let record = tables
            .crew
            .get_mut(&id)
            .ok_or_else(|| RepoError::not_found("crew", id))?;
        record.first_name = crew.first_name;
        record.last_name = crew.last_name;
        Ok(record.clone())
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        let mut tables = self.write();
        if tables.crew.remove(&id).is_none() {
            return Err(RepoError::not_found("crew", id));
        }
        for members in tables.flight_crew.values_mut() {
            members.retain(|crew_id| *crew_id != id);
        }
        Ok(())
    }
}

#[async_trait]
impl RouteRepository for MemStore {
    async fn create(&self, route: NewRoute) -> RepoResult<Route> {
        let mut tables = self.write();
        if !tables.airports.contains_key(&route.source) {
            return Err(RepoError::not_found("airport", route.source));
        }
        if !tables.airports.contains_key(&route.destination) {
            return Err(RepoError::not_found("airport", route.destination));
        }
        let id = tables.next();
        let record = Route {
            id,
            source_id: route.source,
            destination_id: route.destination,
            distance: route.distance,
        };
        tables.routes.insert(id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: i64) -> RepoResult<RouteDetail> {
        self.read().route_detail(id)
    }

    async fn list(&self, filter: &RouteFilter) -> RepoResult<Vec<RouteDetail>> {
        let tables = self.read();
        let mut ids: Vec<i64> = tables.routes.keys().copied().collect();
        ids.sort_unstable();

        let mut routes = Vec::new();
        for id in ids {
            let detail = tables.route_detail(id)?;
            let matches = filter
                .destination
                .as_deref()
                .map_or(true, |name| icontains(&detail.destination.name, name));
            if matches {
                routes.push(detail);
            }
        }
        Ok(routes)
    }

    async fn update(&self, id: i64, route: NewRoute) -> RepoResult<Route> {
        let mut tables = self.write();
        if !tables.airports.contains_key(&route.source) {
            return Err(RepoError::not_found("airport", route.source));
        }
        if !tables.airports.contains_key(&route.destination) {
            return Err(RepoError::not_found("airport", route.destination));
        }
        let record = tables
            .routes
            .get_mut(&id)
            .ok_or_else(|| RepoError::not_found("route", id))?;
        record.source_id = route.source;
        record.destination_id = route.destination;
        record.distance = route.distance;
        Ok(record.clone())
    }
}

#[async_trait]
impl FlightRepository for MemStore {
    async fn create(&self, flight: NewFlight) -> RepoResult<Flight> {
        let mut tables = self.write();
        if !tables.routes.contains_key(&flight.route) {
            return Err(RepoError::not_found("route", flight.route));
        }
        if !tables.airplanes.contains_key(&flight.airplane) {
            return Err(RepoError::not_found("airplane", flight.airplane));
        }
        for crew_id in &flight.crew {
            if !tables.crew.contains_key(crew_id) {
                return Err(RepoError::not_found("crew", *crew_id));
            }
        }
        let id = tables.next();
        let record = Flight {
            id,
            route_id: flight.route,
            airplane_id: flight.airplane,
            departure_time: flight.departure_time,
            arrival_time: flight.arrival_time,
        };
        tables.flights.insert(id, record.clone());
        tables.flight_crew.insert(id, flight.crew);
        Ok(record)
    }

    async fn get(&self, id: i64) -> RepoResult<FlightRecord> {
        self.read().flight_record(id)
    }

    async fn list(&self, filter: &RouteNameFilter) -> RepoResult<Vec<FlightRecord>> {
        let tables = self.read();
        let mut ids: Vec<i64> = tables.flights.keys().copied().collect();
        ids.sort_unstable();

        let mut records = Vec::new();
        for id in ids {
            let record = tables.flight_record(id)?;
            let matches = filter
                .route
                .as_deref()
                .map_or(true, |route| icontains(&record.route_name(), route));
            if matches {
                records.push(record);
            }
        }
        records.sort_by_key(|r| (r.free_seats(), r.flight.id));
        Ok(records)
    }

    async fn update(&self, id: i64, flight: NewFlight) -> RepoResult<Flight> {
        let mut tables = self.write();
        if !tables.routes.contains_key(&flight.route) {
            return Err(RepoError::not_found("route", flight.route));
        }
        if !tables.airplanes.contains_key(&flight.airplane) {
            return Err(RepoError::not_found("airplane", flight.airplane));
        }
        for crew_id in &flight.crew {
            if !tables.crew.contains_key(crew_id) {
                return Err(RepoError::not_found("crew", *crew_id));
            }
        }
        let record = tables
            .flights
            .get_mut(&id)
            .ok_or_else(|| RepoError::not_found("flight", id))?;
        record.route_id = flight.route;
        record.airplane_id = flight.airplane;
        record.departure_time = flight.departure_time;
        record.arrival_time = flight.arrival_time;
        let record = record.clone();
        tables.flight_crew.insert(id, flight.crew);
        Ok(record)
    }

    async fn get_ticket(&self, id: i64) -> RepoResult<TicketRecord> {
        self.read().ticket_record(id)
    }

    async fn list_tickets(&self, filter: &RouteNameFilter) -> RepoResult<Vec<TicketRecord>> {
        let tables = self.read();
        let mut ids: Vec<i64> = tables.tickets.keys().copied().collect();
        ids.sort_unstable();

        let mut records = Vec::new();
        for id in ids {
            let record = tables.ticket_record(id)?;
            let matches = filter
                .route
                .as_deref()
                .map_or(true, |route| icontains(&record.flight.route_name(), route));
            if matches {
                records.push(record);
            }
        }
        Ok(records)
    }
}

#[async_trait]
impl OrderRepository for MemStore {
    async fn create(&self, user_id: i64, tickets: Vec<NewTicket>) -> RepoResult<OrderRecord> {
        let mut tables = self.write();

        // Validate everything up front; nothing is inserted until all
        // candidate tickets pass, which is what the transaction gives the
        // Postgres implementation.
        let mut claimed: Vec<(i64, i32, i32)> = Vec::with_capacity(tickets.len());
        for ticket in &tickets {
            let flight = tables
                .flights
                .get(&ticket.flight)
                .ok_or_else(|| RepoError::not_found("flight", ticket.flight))?;
            let airplane = tables
                .airplanes
                .get(&flight.airplane_id)
                .ok_or_else(|| RepoError::not_found("airplane", flight.airplane_id))?;

            validate_ticket(ticket.row, ticket.seat, airplane.rows, airplane.seats_in_rows)?;

            let key = (ticket.flight, ticket.row, ticket.seat);
            let taken = tables.tickets.values().any(|t| {
                t.flight_id == ticket.flight && t.row == ticket.row && t.seat == ticket.seat
            });
            if taken || claimed.contains(&key) {
                return Err(RepoError::Conflict(format!(
                    "seat {} in row {} is already taken on flight {}",
                    ticket.seat, ticket.row, ticket.flight
                )));
            }
            claimed.push(key);
        }

        let order_id = tables.next();
        let order = Order {
            id: order_id,
            user_id,
            created_at: chrono::Utc::now(),
        };
        tables.orders.insert(order_id, order.clone());
        for ticket in tickets {
            let ticket_id = tables.next();
            tables.tickets.insert(
                ticket_id,
                Ticket {
                    id: ticket_id,
                    row: ticket.row,
                    seat: ticket.seat,
                    flight_id: ticket.flight,
                    order_id,
                },
            );
        }

        tables.order_record(order)
    }

    async fn get(&self, user_id: i64, id: i64) -> RepoResult<OrderRecord> {
        let tables = self.read();
        let order = tables
            .orders
            .get(&id)
            .filter(|o| o.user_id == user_id)
            .cloned()
            .ok_or_else(|| RepoError::not_found("order", id))?;
        tables.order_record(order)
    }

    async fn list(&self, user_id: i64, filter: &OrderFilter) -> RepoResult<Vec<OrderRecord>> {
        let tables = self.read();
        let mut ids: Vec<i64> = tables
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .filter(|o| {
                filter
                    .created_at
                    .map_or(true, |date| o.created_at.date_naive() == date)
            })
            .map(|o| o.id)
            .collect();
        ids.sort_unstable();

        let mut records = Vec::new();
        for id in ids {
            let order = tables
                .orders
                .get(&id)
                .cloned()
                .ok_or_else(|| RepoError::not_found("order", id))?;
            let record = tables.order_record(order)?;
            let matches = filter.route.as_deref().map_or(true, |route| {
                record
                    .tickets
                    .iter()
                    .any(|t| icontains(&t.flight.route_name(), route))
            });
            if matches {
                records.push(record);
            }
        }
        Ok(records)
    }
}

#[async_trait]
impl UserRepository for MemStore {
    async fn create(&self, user: NewUser) -> RepoResult<User> {
        let mut tables = self.write();
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(RepoError::Conflict(format!(
                "a user with email {} already exists",
                user.email
            )));
        }
        let id = tables.next();
        let record = User {
            id,
            email: user.email,
            password_hash: user.password_hash,
            is_staff: user.is_staff,
        };
        tables.users.insert(id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: i64) -> RepoResult<User> {
        self.read()
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| RepoError::not_found("user", id))
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self.read().users.values().find(|u| u.email == email).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    async fn seed_flight(store: &MemStore, rows: i32, seats_in_rows: i32) -> i64 {
        let source = AirportRepository::create(
            store,
            NewAirport {
                name: "Test Airport".to_string(),
                closest_big_city: "Test City".to_string(),
            },
        )
        .await
        .unwrap();
        let destination = AirportRepository::create(
            store,
            NewAirport {
                name: "Tokyo Airport".to_string(),
                closest_big_city: "Tokyo".to_string(),
            },
        )
        .await
        .unwrap();
        let route = RouteRepository::create(
            store,
            NewRoute {
                source: source.id,
                destination: destination.id,
                distance: 5000,
            },
        )
        .await
        .unwrap();
        let airplane_type = store
            .create_airplane_type(NewAirplaneType {
                name: "Regional".to_string(),
            })
            .await
            .unwrap();
        let airplane = store
            .create_airplane(NewAirplane {
                name: "Boeing 777".to_string(),
                rows,
                seats_in_rows,
                airplane_type: airplane_type.id,
            })
            .await
            .unwrap();
        let flight = FlightRepository::create(
            store,
            NewFlight {
                route: route.id,
                airplane: airplane.id,
                departure_time: chrono::Utc.with_ymd_and_hms(2024, 8, 30, 0, 0, 0).unwrap(),
                arrival_time: chrono::Utc.with_ymd_and_hms(2024, 9, 1, 0, 0, 0).unwrap(),
                crew: vec![],
            },
        )
        .await
        .unwrap();
        flight.id
    }

    #[tokio::test]
    async fn free_seats_drop_as_tickets_sell() {
        let store = MemStore::new();
        let flight_id = seed_flight(&store, 10, 6).await;

        let record = FlightRepository::get(&store, flight_id).await.unwrap();
        assert_eq!(record.free_seats(), 60);

        OrderRepository::create(
            &store,
            1,
            vec![NewTicket {
                row: 1,
                seat: 1,
                flight: flight_id,
            }],
        )
        .await
        .unwrap();

        let record = FlightRepository::get(&store, flight_id).await.unwrap();
        assert_eq!(record.free_seats(), 59);
        assert_eq!(record.taken_seats, vec![SeatRef { row: 1, seat: 1 }]);
    }

    #[tokio::test]
    async fn duplicate_seat_is_a_conflict() {
        let store = MemStore::new();
        let flight_id = seed_flight(&store, 10, 6).await;

        OrderRepository::create(
            &store,
            1,
            vec![NewTicket {
                row: 1,
                seat: 1,
                flight: flight_id,
            }],
        )
        .await
        .unwrap();

        let err = OrderRepository::create(
            &store,
            2,
            vec![NewTicket {
                row: 1,
                seat: 1,
                flight: flight_id,
            }],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));
    }

    #[tokio::test]
    async fn order_creation_is_atomic() {
        let store = MemStore::new();
        let flight_id = seed_flight(&store, 10, 6).await;

        // Second ticket is out of range, so nothing may persist.
        let err = OrderRepository::create(
            &store,
            1,
            vec![
                NewTicket {
                    row: 1,
                    seat: 1,
                    flight: flight_id,
                },
                NewTicket {
                    row: 11,
                    seat: 1,
                    flight: flight_id,
                },
            ],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));

        let orders = OrderRepository::list(&store, 1, &OrderFilter::default())
            .await
            .unwrap();
        assert!(orders.is_empty());

        let record = FlightRepository::get(&store, flight_id).await.unwrap();
        assert_eq!(record.free_seats(), 60);
    }

    #[tokio::test]
    async fn duplicate_seat_within_one_order_is_rejected() {
        let store = MemStore::new();
        let flight_id = seed_flight(&store, 10, 6).await;

        let err = OrderRepository::create(
            &store,
            1,
            vec![
                NewTicket {
                    row: 2,
                    seat: 2,
                    flight: flight_id,
                },
                NewTicket {
                    row: 2,
                    seat: 2,
                    flight: flight_id,
                },
            ],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));
    }

    #[tokio::test]
    async fn flights_are_ordered_by_ascending_free_seats() {
        let store = MemStore::new();
        let big = seed_flight(&store, 10, 6).await;
        let small = seed_flight(&store, 2, 2).await;

        let flights = FlightRepository::list(&store, &RouteNameFilter::default())
            .await
            .unwrap();
        let ids: Vec<i64> = flights.iter().map(|f| f.flight.id).collect();
        assert_eq!(ids, vec![small, big]);
    }

    #[tokio::test]
    async fn deleting_an_airport_cascades_to_routes_flights_and_tickets() {
        let store = MemStore::new();
        let flight_id = seed_flight(&store, 10, 6).await;
        OrderRepository::create(
            &store,
            1,
            vec![NewTicket {
                row: 1,
                seat: 1,
                flight: flight_id,
            }],
        )
        .await
        .unwrap();

        let record = FlightRepository::get(&store, flight_id).await.unwrap();
        let source_id = record.route.source.id;
        AirportRepository::delete(&store, source_id).await.unwrap();

        assert!(matches!(
            FlightRepository::get(&store, flight_id).await,
            Err(RepoError::NotFound { .. })
        ));
        let tickets = store.list_tickets(&RouteNameFilter::default()).await.unwrap();
        assert!(tickets.is_empty());

        // The order survives with no tickets, matching the FK graph.
        let orders = OrderRepository::list(&store, 1, &OrderFilter::default())
            .await
            .unwrap();
        assert_eq!(orders.len(), 1);
        assert!(orders[0].tickets.is_empty());
    }
}
