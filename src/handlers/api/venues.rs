use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use utoipa::IntoParams;

use crate::actions;
use crate::error::AppError;
use crate::models::{Region, Venue, VenueInput};

#[derive(Debug, Deserialize, IntoParams)]
pub struct VenueFilter {
    /// Only venues of this region
    pub region: Option<Region>,
}

#[utoipa::path(
    get,
    path = "/api/venues",
    tag = "venues",
    params(VenueFilter),
    responses(
        (status = 200, description = "List venues", body = Vec<Venue>),
        (status = 400, description = "Unknown region")
    )
)]
pub async fn list_venues(
    State(pool): State<SqlitePool>,
    Query(filter): Query<VenueFilter>,
) -> Result<Json<Vec<Venue>>, AppError> {
    Ok(Json(Venue::find_all(&pool, filter.region).await?))
}

#[utoipa::path(
    post,
    path = "/api/venues",
    tag = "venues",
    request_body = VenueInput,
    responses(
        (status = 201, description = "Venue created", body = Venue),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_venue(
    State(pool): State<SqlitePool>,
    Json(data): Json<Map<String, Value>>,
) -> Result<(StatusCode, Json<Venue>), AppError> {
    let venue = actions::venue::create(&pool, data).await?;
    Ok((StatusCode::CREATED, Json(venue)))
}

#[utoipa::path(
    get,
    path = "/api/venues/{id}",
    tag = "venues",
    params(("id" = i64, Path, description = "Venue ID")),
    responses(
        (status = 200, description = "Venue found", body = Venue),
        (status = 404, description = "Venue not found")
    )
)]
pub async fn get_venue(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<Json<Venue>, AppError> {
    let venue = Venue::find_by_id(&pool, id)
        .await?
        .ok_or(AppError::NotFound("Venue"))?;
    Ok(Json(venue))
}

#[utoipa::path(
    put,
    path = "/api/venues/{id}",
    tag = "venues",
    params(("id" = i64, Path, description = "Venue ID")),
    request_body = VenueInput,
    responses(
        (status = 200, description = "Venue updated", body = Venue),
        (status = 404, description = "Venue not found"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn update_venue(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(data): Json<Map<String, Value>>,
) -> Result<Json<Venue>, AppError> {
    Ok(Json(actions::venue::update(&pool, id, data).await?))
}
