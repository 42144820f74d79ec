use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use aeroway_core::filters::CrewFilter;
use aeroway_core::models::{Crew, NewCrew};

use crate::error::AppError;
use crate::middleware::auth::{require_staff, CurrentUser};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CrewResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl From<Crew> for CrewResponse {
    fn from(crew: Crew) -> Self {
        CrewResponse {
            id: crew.id,
            first_name: crew.first_name,
            last_name: crew.last_name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CrewListParams {
    first_name: Option<String>,
    last_name: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/crew", get(list).post(create))
        .route("/crew/{id}", get(detail).put(update).delete(remove))
}

async fn list(
    State(state): State<AppState>,
    Query(params): Query<CrewListParams>,
) -> Result<Json<Vec<CrewResponse>>, AppError> {
    let filter = CrewFilter {
        first_name: params.first_name,
        last_name: params.last_name,
    };
    let crew = state.crew.list(&filter).await?;
    Ok(Json(crew.into_iter().map(Into::into).collect()))
}

async fn detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CrewResponse>, AppError> {
    let member = state.crew.get(id).await?;
    Ok(Json(member.into()))
}

async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<NewCrew>,
) -> Result<(StatusCode, Json<CrewResponse>), AppError> {
    require_staff(&current)?;
    let member = state.crew.create(req).await?;
    info!("Created crew member {}", member.id);
    Ok((StatusCode::CREATED, Json(member.into())))
}

async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<NewCrew>,
) -> Result<Json<CrewResponse>, AppError> {
    require_staff(&current)?;
    let member = state.crew.update(id, req).await?;
    Ok(Json(member.into()))
}

async fn remove(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    require_staff(&current)?;
    state.crew.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
