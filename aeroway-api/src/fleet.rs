//! Airplane types and airplanes. The airplane read shapes follow the
//! list/detail split: lists carry the type name, details nest the full type.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use aeroway_core::filters::{parse_id_list, AirplaneFilter, NameFilter};
use aeroway_core::models::{Airplane, AirplaneType, AirplaneWithType, NewAirplane, NewAirplaneType};
use aeroway_core::validation::validate_airplane;

use crate::error::AppError;
use crate::media::read_image_field;
use crate::middleware::auth::{require_staff, CurrentUser};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AirplaneTypeResponse {
    pub id: i64,
    pub name: String,
}

impl From<AirplaneType> for AirplaneTypeResponse {
    fn from(airplane_type: AirplaneType) -> Self {
        AirplaneTypeResponse {
            id: airplane_type.id,
            name: airplane_type.name,
        }
    }
}

#[derive(Debug, Serialize)]
struct AirplaneListItem {
    id: i64,
    name: String,
    airplane_type: String,
    image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AirplaneDetailResponse {
    pub id: i64,
    pub name: String,
    pub rows: i32,
    pub seats_in_rows: i32,
    pub airplane_type: AirplaneTypeResponse,
    pub image: Option<String>,
}

impl From<AirplaneWithType> for AirplaneDetailResponse {
    fn from(record: AirplaneWithType) -> Self {
        AirplaneDetailResponse {
            id: record.airplane.id,
            name: record.airplane.name,
            rows: record.airplane.rows,
            seats_in_rows: record.airplane.seats_in_rows,
            airplane_type: record.airplane_type.into(),
            image: record.airplane.image,
        }
    }
}

/// Write operations echo the id form.
#[derive(Debug, Serialize)]
struct AirplaneWriteResponse {
    id: i64,
    name: String,
    rows: i32,
    seats_in_rows: i32,
    airplane_type: i64,
    image: Option<String>,
}

impl From<Airplane> for AirplaneWriteResponse {
    fn from(airplane: Airplane) -> Self {
        AirplaneWriteResponse {
            id: airplane.id,
            name: airplane.name,
            rows: airplane.rows,
            seats_in_rows: airplane.seats_in_rows,
            airplane_type: airplane.airplane_type_id,
            image: airplane.image,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TypeListParams {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AirplaneListParams {
    name: Option<String>,
    airplane_type: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/airplane_types", get(list_types).post(create_type))
        .route(
            "/airplane_types/{id}",
            get(type_detail).put(update_type).delete(remove_type),
        )
        .route("/airplanes", get(list_airplanes).post(create_airplane))
        .route(
            "/airplanes/{id}",
            get(airplane_detail)
                .put(update_airplane)
                .delete(remove_airplane),
        )
        .route("/airplanes/{id}/upload-image", post(upload_airplane_image))
}

// ============================================================================
// Airplane types
// ============================================================================

async fn list_types(
    State(state): State<AppState>,
    Query(params): Query<TypeListParams>,
) -> Result<Json<Vec<AirplaneTypeResponse>>, AppError> {
    let filter = NameFilter { name: params.name };
    let types = state.fleet.list_airplane_types(&filter).await?;
    Ok(Json(types.into_iter().map(Into::into).collect()))
}

async fn type_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AirplaneTypeResponse>, AppError> {
    let airplane_type = state.fleet.get_airplane_type(id).await?;
    Ok(Json(airplane_type.into()))
}

async fn create_type(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<NewAirplaneType>,
) -> Result<(StatusCode, Json<AirplaneTypeResponse>), AppError> {
    require_staff(&current)?;
    let airplane_type = state.fleet.create_airplane_type(req).await?;
    info!("Created airplane type {}", airplane_type.id);
    Ok((StatusCode::CREATED, Json(airplane_type.into())))
}

async fn update_type(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<NewAirplaneType>,
) -> Result<Json<AirplaneTypeResponse>, AppError> {
    require_staff(&current)?;
    let airplane_type = state.fleet.update_airplane_type(id, req).await?;
    Ok(Json(airplane_type.into()))
}

async fn remove_type(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    require_staff(&current)?;
    state.fleet.delete_airplane_type(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Airplanes
// ============================================================================

async fn list_airplanes(
    State(state): State<AppState>,
    Query(params): Query<AirplaneListParams>,
) -> Result<Json<Vec<AirplaneListItem>>, AppError> {
    let filter = AirplaneFilter {
        name: params.name,
        airplane_type: params
            .airplane_type
            .as_deref()
            .map(parse_id_list)
            .transpose()?,
    };
    let airplanes = state.fleet.list_airplanes(&filter).await?;
    Ok(Json(
        airplanes
            .into_iter()
            .map(|record| AirplaneListItem {
                id: record.airplane.id,
                name: record.airplane.name,
                airplane_type: record.airplane_type.name,
                image: record.airplane.image,
            })
            .collect(),
    ))
}

async fn airplane_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AirplaneDetailResponse>, AppError> {
    let record = state.fleet.get_airplane(id).await?;
    Ok(Json(record.into()))
}

async fn create_airplane(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<NewAirplane>,
) -> Result<(StatusCode, Json<AirplaneWriteResponse>), AppError> {
    require_staff(&current)?;
    validate_airplane(req.rows, req.seats_in_rows)?;
    let airplane = state.fleet.create_airplane(req).await?;
    info!("Created airplane {}", airplane.id);
    Ok((StatusCode::CREATED, Json(airplane.into())))
}

async fn update_airplane(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<NewAirplane>,
) -> Result<Json<AirplaneWriteResponse>, AppError> {
    require_staff(&current)?;
    validate_airplane(req.rows, req.seats_in_rows)?;
    let airplane = state.fleet.update_airplane(id, req).await?;
    Ok(Json(airplane.into()))
}

async fn remove_airplane(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    require_staff(&current)?;
    state.fleet.delete_airplane(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn upload_airplane_image(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<AirplaneWriteResponse>, AppError> {
    require_staff(&current)?;
    state.fleet.get_airplane(id).await?;

    let (file_name, bytes) = read_image_field(multipart).await?;
    let path = state.media.save("airplanes", &file_name, &bytes).await?;
    let airplane = state.fleet.set_airplane_image(id, &path).await?;
    Ok(Json(airplane.into()))
}
