//! Flights. Listings are ordered by ascending free seats; `taken_seats` on
//! the list shape is the seat numbers already sold, the detail shape carries
//! full row/seat pairs.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use aeroway_core::filters::RouteNameFilter;
use aeroway_core::models::{Flight, FlightRecord, NewFlight, SeatRef};

use crate::crew::CrewResponse;
use crate::error::AppError;
use crate::fleet::AirplaneDetailResponse;
use crate::middleware::auth::{require_staff, CurrentUser};
use crate::routes::RouteDetailResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct FlightListItem {
    pub id: i64,
    pub route: String,
    pub airplane: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub free_seats: i64,
    pub taken_seats: Vec<i32>,
}

impl From<&FlightRecord> for FlightListItem {
    fn from(record: &FlightRecord) -> Self {
        FlightListItem {
            id: record.flight.id,
            route: record.route_name(),
            airplane: record.airplane.airplane.name.clone(),
            departure_time: record.flight.departure_time,
            arrival_time: record.flight.arrival_time,
            free_seats: record.free_seats(),
            taken_seats: record.taken_seats.iter().map(|s| s.seat).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SeatResponse {
    pub row: i32,
    pub seat: i32,
}

impl From<SeatRef> for SeatResponse {
    fn from(seat: SeatRef) -> Self {
        SeatResponse {
            row: seat.row,
            seat: seat.seat,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FlightDetailResponse {
    pub id: i64,
    pub route: RouteDetailResponse,
    pub airplane: AirplaneDetailResponse,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub crew: Vec<CrewResponse>,
    pub taken_seats: Vec<SeatResponse>,
}

impl From<FlightRecord> for FlightDetailResponse {
    fn from(record: FlightRecord) -> Self {
        FlightDetailResponse {
            id: record.flight.id,
            route: record.route.into(),
            airplane: record.airplane.into(),
            departure_time: record.flight.departure_time,
            arrival_time: record.flight.arrival_time,
            crew: record.crew.into_iter().map(Into::into).collect(),
            taken_seats: record.taken_seats.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct FlightWriteResponse {
    id: i64,
    route: i64,
    airplane: i64,
    departure_time: DateTime<Utc>,
    arrival_time: DateTime<Utc>,
    crew: Vec<i64>,
}

#[derive(Debug, Deserialize)]
struct FlightListParams {
    route: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/flights", get(list).post(create))
        .route("/flights/{id}", get(detail).put(update))
}

async fn list(
    State(state): State<AppState>,
    Query(params): Query<FlightListParams>,
) -> Result<Json<Vec<FlightListItem>>, AppError> {
    let filter = RouteNameFilter {
        route: params.route,
    };
    let flights = state.flights.list(&filter).await?;
    Ok(Json(flights.iter().map(Into::into).collect()))
}

async fn detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<FlightDetailResponse>, AppError> {
    let record = state.flights.get(id).await?;
    Ok(Json(record.into()))
}

async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<NewFlight>,
) -> Result<(StatusCode, Json<FlightWriteResponse>), AppError> {
    require_staff(&current)?;
    let crew = req.crew.clone();
    let flight = state.flights.create(req).await?;
    info!("Created flight {}", flight.id);
    Ok((StatusCode::CREATED, Json(write_response(flight, crew))))
}

async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<NewFlight>,
) -> Result<Json<FlightWriteResponse>, AppError> {
    require_staff(&current)?;
    let crew = req.crew.clone();
    let flight = state.flights.update(id, req).await?;
    Ok(Json(write_response(flight, crew)))
}

fn write_response(flight: Flight, crew: Vec<i64>) -> FlightWriteResponse {
    FlightWriteResponse {
        id: flight.id,
        route: flight.route_id,
        airplane: flight.airplane_id,
        departure_time: flight.departure_time,
        arrival_time: flight.arrival_time,
        crew,
    }
}
