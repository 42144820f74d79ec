//! Read-only tickets collection. Tickets are created through orders; these
//! endpoints only expose them.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use aeroway_core::filters::RouteNameFilter;
use aeroway_core::models::TicketRecord;

use crate::error::AppError;
use crate::flights::{FlightDetailResponse, FlightListItem};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TicketListItem {
    pub id: i64,
    pub row: i32,
    pub seat: i32,
    pub flight: FlightListItem,
}

impl From<&TicketRecord> for TicketListItem {
    fn from(record: &TicketRecord) -> Self {
        TicketListItem {
            id: record.ticket.id,
            row: record.ticket.row,
            seat: record.ticket.seat,
            flight: (&record.flight).into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TicketDetailResponse {
    pub id: i64,
    pub row: i32,
    pub seat: i32,
    pub flight: FlightDetailResponse,
}

impl From<TicketRecord> for TicketDetailResponse {
    fn from(record: TicketRecord) -> Self {
        TicketDetailResponse {
            id: record.ticket.id,
            row: record.ticket.row,
            seat: record.ticket.seat,
            flight: record.flight.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TicketListParams {
    route: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tickets", get(list))
        .route("/tickets/{id}", get(detail))
}

async fn list(
    State(state): State<AppState>,
    Query(params): Query<TicketListParams>,
) -> Result<Json<Vec<TicketListItem>>, AppError> {
    let filter = RouteNameFilter {
        route: params.route,
    };
    let tickets = state.flights.list_tickets(&filter).await?;
    Ok(Json(tickets.iter().map(Into::into).collect()))
}

async fn detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TicketDetailResponse>, AppError> {
    let record = state.flights.get_ticket(id).await?;
    Ok(Json(record.into()))
}
