//! Routes between airports. No delete endpoint; DELETE on these paths is a
//! method-not-allowed.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use aeroway_core::filters::RouteFilter;
use aeroway_core::models::{NewRoute, Route, RouteDetail};
use aeroway_core::validation::validate_route;

use crate::airports::AirportResponse;
use crate::error::AppError;
use crate::middleware::auth::{require_staff, CurrentUser};
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct RouteListItem {
    id: i64,
    route_name: String,
    source: String,
    destination: String,
    distance: i32,
}

#[derive(Debug, Serialize)]
pub struct RouteDetailResponse {
    pub id: i64,
    pub route_name: String,
    pub source: AirportResponse,
    pub destination: AirportResponse,
    pub distance: i32,
}

impl From<RouteDetail> for RouteDetailResponse {
    fn from(detail: RouteDetail) -> Self {
        let route_name = detail.route_name();
        RouteDetailResponse {
            id: detail.route.id,
            route_name,
            source: detail.source.into(),
            destination: detail.destination.into(),
            distance: detail.route.distance,
        }
    }
}

#[derive(Debug, Serialize)]
struct RouteWriteResponse {
    id: i64,
    source: i64,
    destination: i64,
    distance: i32,
}

impl From<Route> for RouteWriteResponse {
    fn from(route: Route) -> Self {
        RouteWriteResponse {
            id: route.id,
            source: route.source_id,
            destination: route.destination_id,
            distance: route.distance,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RouteListParams {
    destination: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/route", get(list).post(create))
        .route("/route/{id}", get(detail).put(update))
}

async fn list(
    State(state): State<AppState>,
    Query(params): Query<RouteListParams>,
) -> Result<Json<Vec<RouteListItem>>, AppError> {
    let filter = RouteFilter {
        destination: params.destination,
    };
    let routes = state.routes.list(&filter).await?;
    Ok(Json(
        routes
            .into_iter()
            .map(|detail| RouteListItem {
                id: detail.route.id,
                route_name: detail.route_name(),
                source: detail.source.name,
                destination: detail.destination.name,
                distance: detail.route.distance,
            })
            .collect(),
    ))
}

async fn detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RouteDetailResponse>, AppError> {
    let route = state.routes.get(id).await?;
    Ok(Json(route.into()))
}

async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<NewRoute>,
) -> Result<(StatusCode, Json<RouteWriteResponse>), AppError> {
    require_staff(&current)?;
    validate_route(req.distance)?;
    let route = state.routes.create(req).await?;
    info!("Created route {}", route.id);
    Ok((StatusCode::CREATED, Json(route.into())))
}

async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<NewRoute>,
) -> Result<Json<RouteWriteResponse>, AppError> {
    require_staff(&current)?;
    validate_route(req.distance)?;
    let route = state.routes.update(id, req).await?;
    Ok(Json(route.into()))
}
