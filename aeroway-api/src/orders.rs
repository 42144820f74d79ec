//! Orders, always scoped to the requesting user. Creation books every ticket
//! in the payload atomically.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use aeroway_core::filters::{parse_date, OrderFilter};
use aeroway_core::models::{NewTicket, OrderRecord};

use crate::error::AppError;
use crate::middleware::auth::CurrentUser;
use crate::state::AppState;
use crate::tickets::{TicketDetailResponse, TicketListItem};

#[derive(Debug, Serialize)]
struct OrderListItem {
    id: i64,
    created_at: DateTime<Utc>,
    tickets: Vec<TicketListItem>,
}

impl From<&OrderRecord> for OrderListItem {
    fn from(record: &OrderRecord) -> Self {
        OrderListItem {
            id: record.order.id,
            created_at: record.order.created_at,
            tickets: record.tickets.iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct OrderDetailResponse {
    id: i64,
    created_at: DateTime<Utc>,
    tickets: Vec<TicketDetailResponse>,
}

impl From<OrderRecord> for OrderDetailResponse {
    fn from(record: OrderRecord) -> Self {
        OrderDetailResponse {
            id: record.order.id,
            created_at: record.order.created_at,
            tickets: record.tickets.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct NewOrderRequest {
    tickets: Vec<NewTicket>,
}

#[derive(Debug, Deserialize)]
struct OrderListParams {
    created_at: Option<String>,
    route: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list).post(create))
        .route("/orders/{id}", get(detail))
}

async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<OrderListParams>,
) -> Result<Json<Vec<OrderListItem>>, AppError> {
    let filter = OrderFilter {
        created_at: params.created_at.as_deref().map(parse_date).transpose()?,
        route: params.route,
    };
    let orders = state.orders.list(current.id, &filter).await?;
    Ok(Json(orders.iter().map(Into::into).collect()))
}

async fn detail(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Json<OrderDetailResponse>, AppError> {
    let record = state.orders.get(current.id, id).await?;
    Ok(Json(record.into()))
}

async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<NewOrderRequest>,
) -> Result<(StatusCode, Json<OrderListItem>), AppError> {
    let record = state.orders.create(current.id, req.tickets).await?;
    info!("Created order {} for user {}", record.order.id, current.id);
    Ok((StatusCode::CREATED, Json((&record).into())))
}
