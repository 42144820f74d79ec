use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use aeroway_core::filters::NameFilter;
use aeroway_core::models::{Airport, NewAirport};

use crate::error::AppError;
use crate::media::read_image_field;
use crate::middleware::auth::{require_staff, CurrentUser};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AirportResponse {
    pub id: i64,
    pub name: String,
    pub closest_big_city: String,
    pub image: Option<String>,
}

impl From<Airport> for AirportResponse {
    fn from(airport: Airport) -> Self {
        AirportResponse {
            id: airport.id,
            name: airport.name,
            closest_big_city: airport.closest_big_city,
            image: airport.image,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AirportListParams {
    name: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/airports", get(list).post(create))
        .route("/airports/{id}", get(detail).put(update).delete(remove))
        .route("/airports/{id}/upload-image", post(upload_image))
}

async fn list(
    State(state): State<AppState>,
    Query(params): Query<AirportListParams>,
) -> Result<Json<Vec<AirportResponse>>, AppError> {
    let filter = NameFilter { name: params.name };
    let airports = state.airports.list(&filter).await?;
    Ok(Json(airports.into_iter().map(Into::into).collect()))
}

async fn detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AirportResponse>, AppError> {
    let airport = state.airports.get(id).await?;
    Ok(Json(airport.into()))
}

async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<NewAirport>,
) -> Result<(StatusCode, Json<AirportResponse>), AppError> {
    require_staff(&current)?;
    let airport = state.airports.create(req).await?;
    info!("Created airport {}", airport.id);
    Ok((StatusCode::CREATED, Json(airport.into())))
}

async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<NewAirport>,
) -> Result<Json<AirportResponse>, AppError> {
    require_staff(&current)?;
    let airport = state.airports.update(id, req).await?;
    Ok(Json(airport.into()))
}

async fn remove(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    require_staff(&current)?;
    state.airports.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn upload_image(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<AirportResponse>, AppError> {
    require_staff(&current)?;
    // The record must exist before we touch the disk.
    state.airports.get(id).await?;

    let (file_name, bytes) = read_image_field(multipart).await?;
    let path = state.media.save("airports", &file_name, &bytes).await?;
    let airport = state.airports.set_image(id, &path).await?;
    Ok(Json(airport.into()))
}
