//! Postgres flight repository, plus the shared loader other repositories use
//! to assemble full flight records (ticket and order reads nest them).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use aeroway_core::filters::RouteNameFilter;
use aeroway_core::models::{Crew, Flight, FlightRecord, NewFlight, SeatRef, Ticket, TicketRecord};
use aeroway_core::repository::{FlightRepository, RepoError, RepoResult};

use crate::catalog_repo::{load_airplane_with_type, load_route_detail};
use crate::map_sqlx_err;

#[derive(sqlx::FromRow)]
struct FlightRow {
    id: i64,
    route_id: i64,
    airplane_id: i64,
    departure_time: DateTime<Utc>,
    arrival_time: DateTime<Utc>,
}

impl From<FlightRow> for Flight {
    fn from(row: FlightRow) -> Self {
        Flight {
            id: row.id,
            route_id: row.route_id,
            airplane_id: row.airplane_id,
            departure_time: row.departure_time,
            arrival_time: row.arrival_time,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SeatRow {
    row: i32,
    seat: i32,
}

#[derive(sqlx::FromRow)]
struct CrewRow {
    id: i64,
    first_name: String,
    last_name: String,
}

#[derive(sqlx::FromRow)]
struct TicketRow {
    id: i64,
    row: i32,
    seat: i32,
    flight_id: i64,
    order_id: i64,
}

impl From<TicketRow> for Ticket {
    fn from(row: TicketRow) -> Self {
        Ticket {
            id: row.id,
            row: row.row,
            seat: row.seat,
            flight_id: row.flight_id,
            order_id: row.order_id,
        }
    }
}

/// Assembles a full flight record: flight row, joined route and airplane,
/// crew, and the seats already sold.
pub(crate) async fn load_flight_record(pool: &PgPool, id: i64) -> RepoResult<FlightRecord> {
    let flight_row = sqlx::query_as::<_, FlightRow>(
        "SELECT id, route_id, airplane_id, departure_time, arrival_time \
         FROM flights WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(map_sqlx_err)?
    .ok_or_else(|| RepoError::not_found("flight", id))?;

    let route = load_route_detail(pool, flight_row.route_id).await?;
    let airplane = load_airplane_with_type(pool, flight_row.airplane_id).await?;

    let crew_rows = sqlx::query_as::<_, CrewRow>(
        "SELECT c.id, c.first_name, c.last_name FROM crew c \
         JOIN flight_crew fc ON fc.crew_id = c.id \
         WHERE fc.flight_id = $1 ORDER BY c.id",
    )
    .bind(id)
    .fetch_all(pool)
    .await
    .map_err(map_sqlx_err)?;

    let seat_rows = sqlx::query_as::<_, SeatRow>(
        "SELECT \"row\", seat FROM tickets WHERE flight_id = $1 ORDER BY \"row\", seat",
    )
    .bind(id)
    .fetch_all(pool)
    .await
    .map_err(map_sqlx_err)?;

    Ok(FlightRecord {
        flight: flight_row.into(),
        route,
        airplane,
        crew: crew_rows
            .into_iter()
            .map(|c| Crew {
                id: c.id,
                first_name: c.first_name,
                last_name: c.last_name,
            })
            .collect(),
        taken_seats: seat_rows
            .into_iter()
            .map(|s| SeatRef {
                row: s.row,
                seat: s.seat,
            })
            .collect(),
    })
}

pub(crate) async fn load_ticket_record(pool: &PgPool, id: i64) -> RepoResult<TicketRecord> {
    let ticket_row = sqlx::query_as::<_, TicketRow>(
        "SELECT id, \"row\", seat, flight_id, order_id FROM tickets WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(map_sqlx_err)?
    .ok_or_else(|| RepoError::not_found("ticket", id))?;

    let flight = load_flight_record(pool, ticket_row.flight_id).await?;
    Ok(TicketRecord {
        ticket: ticket_row.into(),
        flight,
    })
}

pub struct PgFlightRepository {
    pool: PgPool,
}

impl PgFlightRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn require_crew(&self, ids: &[i64]) -> RepoResult<()> {
        for crew_id in ids {
            let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM crew WHERE id = $1")
                .bind(crew_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_err)?;
            if exists.is_none() {
                return Err(RepoError::not_found("crew", *crew_id));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl FlightRepository for PgFlightRepository {
    async fn create(&self, flight: NewFlight) -> RepoResult<Flight> {
        load_route_detail(&self.pool, flight.route).await?;
        load_airplane_with_type(&self.pool, flight.airplane).await?;
        self.require_crew(&flight.crew).await?;

        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;

        let row = sqlx::query_as::<_, FlightRow>(
            "INSERT INTO flights (route_id, airplane_id, departure_time, arrival_time) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, route_id, airplane_id, departure_time, arrival_time",
        )
        .bind(flight.route)
        .bind(flight.airplane)
        .bind(flight.departure_time)
        .bind(flight.arrival_time)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_err)?;

        for crew_id in &flight.crew {
            sqlx::query("INSERT INTO flight_crew (flight_id, crew_id) VALUES ($1, $2)")
                .bind(row.id)
                .bind(crew_id)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_err)?;
        }

        tx.commit().await.map_err(map_sqlx_err)?;
        Ok(row.into())
    }

    async fn get(&self, id: i64) -> RepoResult<FlightRecord> {
        load_flight_record(&self.pool, id).await
    }

    async fn list(&self, filter: &RouteNameFilter) -> RepoResult<Vec<FlightRecord>> {
        // Ids first, ordered by ascending free seats, then the full records.
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT DISTINCT f.id, \
             a.\"rows\"::bigint * a.seats_in_rows::bigint \
               - (SELECT COUNT(*) FROM tickets t WHERE t.flight_id = f.id) AS free_seats \
             FROM flights f \
             JOIN routes r ON r.id = f.route_id \
             JOIN airports s ON s.id = r.source_id \
             JOIN airports d ON d.id = r.destination_id \
             JOIN airplanes a ON a.id = f.airplane_id \
             WHERE 1=1",
        );
        if let Some(route) = &filter.route {
            qb.push(" AND (s.name || ' - ' || d.name) ILIKE ");
            qb.push_bind(format!("%{}%", route));
        }
        qb.push(" ORDER BY free_seats ASC, f.id ASC");

        let ids: Vec<(i64, i64)> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        let mut records = Vec::with_capacity(ids.len());
        for (id, _) in ids {
            records.push(load_flight_record(&self.pool, id).await?);
        }
        Ok(records)
    }

    async fn update(&self, id: i64, flight: NewFlight) -> RepoResult<Flight> {
        load_route_detail(&self.pool, flight.route).await?;
        load_airplane_with_type(&self.pool, flight.airplane).await?;
        self.require_crew(&flight.crew).await?;

        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;

        let row = sqlx::query_as::<_, FlightRow>(
            "UPDATE flights SET route_id = $1, airplane_id = $2, departure_time = $3, \
             arrival_time = $4 WHERE id = $5 \
             RETURNING id, route_id, airplane_id, departure_time, arrival_time",
        )
        .bind(flight.route)
        .bind(flight.airplane)
        .bind(flight.departure_time)
        .bind(flight.arrival_time)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_err)?
        .ok_or_else(|| RepoError::not_found("flight", id))?;

        sqlx::query("DELETE FROM flight_crew WHERE flight_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;
        for crew_id in &flight.crew {
            sqlx::query("INSERT INTO flight_crew (flight_id, crew_id) VALUES ($1, $2)")
                .bind(id)
                .bind(crew_id)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_err)?;
        }

        tx.commit().await.map_err(map_sqlx_err)?;
        Ok(row.into())
    }

    async fn get_ticket(&self, id: i64) -> RepoResult<TicketRecord> {
        load_ticket_record(&self.pool, id).await
    }

    async fn list_tickets(&self, filter: &RouteNameFilter) -> RepoResult<Vec<TicketRecord>> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT DISTINCT t.id FROM tickets t \
             JOIN flights f ON f.id = t.flight_id \
             JOIN routes r ON r.id = f.route_id \
             JOIN airports s ON s.id = r.source_id \
             JOIN airports d ON d.id = r.destination_id \
             WHERE 1=1",
        );
        if let Some(route) = &filter.route {
            qb.push(" AND (s.name || ' - ' || d.name) ILIKE ");
            qb.push_bind(format!("%{}%", route));
        }
        qb.push(" ORDER BY t.id");

        let ids: Vec<(i64,)> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        let mut records = Vec::with_capacity(ids.len());
        for (id,) in ids {
            records.push(load_ticket_record(&self.pool, id).await?);
        }
        Ok(records)
    }
}
