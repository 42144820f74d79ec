//! Postgres order repository. The create path is the one multi-row write in
//! the system and runs inside a single transaction: every candidate seat is
//! validated against the flight's airplane before any row is inserted, and a
//! duplicate seat rolls the whole order back.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use aeroway_core::filters::OrderFilter;
use aeroway_core::models::{NewTicket, Order, OrderRecord, TicketRecord};
use aeroway_core::repository::{OrderRepository, RepoError, RepoResult};
use aeroway_core::validation::validate_ticket;

use crate::flight_repo::load_ticket_record;
use crate::map_sqlx_err;

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    user_id: i64,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.id,
            user_id: row.user_id,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AirplaneDims {
    rows: i32,
    seats_in_rows: i32,
}

pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_record(&self, order: Order) -> RepoResult<OrderRecord> {
        let ticket_ids: Vec<(i64,)> =
            sqlx::query_as("SELECT id FROM tickets WHERE order_id = $1 ORDER BY id")
                .bind(order.id)
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_err)?;

        let mut tickets: Vec<TicketRecord> = Vec::with_capacity(ticket_ids.len());
        for (ticket_id,) in ticket_ids {
            tickets.push(load_ticket_record(&self.pool, ticket_id).await?);
        }
        Ok(OrderRecord { order, tickets })
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn create(&self, user_id: i64, tickets: Vec<NewTicket>) -> RepoResult<OrderRecord> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;

        let order_row = sqlx::query_as::<_, OrderRow>(
            "INSERT INTO orders (user_id) VALUES ($1) RETURNING id, user_id, created_at",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_err)?;

        for ticket in &tickets {
            let dims = sqlx::query_as::<_, AirplaneDims>(
                "SELECT a.\"rows\", a.seats_in_rows FROM flights f \
                 JOIN airplanes a ON a.id = f.airplane_id WHERE f.id = $1",
            )
            .bind(ticket.flight)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx_err)?
            .ok_or_else(|| RepoError::not_found("flight", ticket.flight))?;

            validate_ticket(ticket.row, ticket.seat, dims.rows, dims.seats_in_rows)?;

            sqlx::query(
                "INSERT INTO tickets (\"row\", seat, flight_id, order_id) VALUES ($1, $2, $3, $4)",
            )
            .bind(ticket.row)
            .bind(ticket.seat)
            .bind(ticket.flight)
            .bind(order_row.id)
            .execute(&mut *tx)
            .await
            .map_err(|err| match map_sqlx_err(err) {
                RepoError::Conflict(_) => RepoError::Conflict(format!(
                    "seat {} in row {} is already taken on flight {}",
                    ticket.seat, ticket.row, ticket.flight
                )),
                other => other,
            })?;
        }

        tx.commit().await.map_err(map_sqlx_err)?;
        self.load_record(order_row.into()).await
    }

    async fn get(&self, user_id: i64, id: i64) -> RepoResult<OrderRecord> {
        let order_row = sqlx::query_as::<_, OrderRow>(
            "SELECT id, user_id, created_at FROM orders WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?
        .ok_or_else(|| RepoError::not_found("order", id))?;

        self.load_record(order_row.into()).await
    }

    async fn list(&self, user_id: i64, filter: &OrderFilter) -> RepoResult<Vec<OrderRecord>> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT DISTINCT o.id, o.user_id, o.created_at FROM orders o \
             LEFT JOIN tickets t ON t.order_id = o.id \
             LEFT JOIN flights f ON f.id = t.flight_id \
             LEFT JOIN routes r ON r.id = f.route_id \
             LEFT JOIN airports s ON s.id = r.source_id \
             LEFT JOIN airports d ON d.id = r.destination_id \
             WHERE o.user_id = ",
        );
        qb.push_bind(user_id);
        if let Some(date) = &filter.created_at {
            qb.push(" AND o.created_at::date = ");
            qb.push_bind::<NaiveDate>(*date);
        }
        if let Some(route) = &filter.route {
            qb.push(" AND (s.name || ' - ' || d.name) ILIKE ");
            qb.push_bind(format!("%{}%", route));
        }
        qb.push(" ORDER BY o.id");

        let rows: Vec<OrderRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(self.load_record(row.into()).await?);
        }
        Ok(records)
    }
}
