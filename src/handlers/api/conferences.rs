use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{Map, Value};
use sqlx::SqlitePool;

use super::{check_bulk_action, BulkRequest, BulkResponse};
use crate::actions;
use crate::error::AppError;
use crate::models::{Attendee, Conference, ConferenceDetail, ConferenceInput, ConferenceListItem};
use crate::resources::{ConferenceResource, Resource};

#[utoipa::path(
    get,
    path = "/api/conferences",
    tag = "conferences",
    responses(
        (status = 200, description = "List all conferences", body = Vec<ConferenceListItem>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_conferences(
    State(pool): State<SqlitePool>,
) -> Result<Json<Vec<ConferenceListItem>>, AppError> {
    Ok(Json(Conference::find_all(&pool).await?))
}

#[utoipa::path(
    post,
    path = "/api/conferences",
    tag = "conferences",
    request_body = ConferenceInput,
    responses(
        (status = 201, description = "Conference created", body = ConferenceDetail),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_conference(
    State(pool): State<SqlitePool>,
    Json(data): Json<Map<String, Value>>,
) -> Result<(StatusCode, Json<ConferenceDetail>), AppError> {
    let conference = actions::conference::create(&pool, data).await?;
    let detail = Conference::detail(&pool, conference.id)
        .await?
        .ok_or(AppError::NotFound("Conference"))?;
    Ok((StatusCode::CREATED, Json(detail)))
}

#[utoipa::path(
    get,
    path = "/api/conferences/{id}",
    tag = "conferences",
    params(("id" = i64, Path, description = "Conference ID")),
    responses(
        (status = 200, description = "Conference found", body = ConferenceDetail),
        (status = 404, description = "Conference not found")
    )
)]
pub async fn get_conference(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<Json<ConferenceDetail>, AppError> {
    let detail = Conference::detail(&pool, id)
        .await?
        .ok_or(AppError::NotFound("Conference"))?;
    Ok(Json(detail))
}

#[utoipa::path(
    put,
    path = "/api/conferences/{id}",
    tag = "conferences",
    params(("id" = i64, Path, description = "Conference ID")),
    request_body = ConferenceInput,
    responses(
        (status = 200, description = "Conference updated", body = ConferenceDetail),
        (status = 404, description = "Conference not found"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn update_conference(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(data): Json<Map<String, Value>>,
) -> Result<Json<ConferenceDetail>, AppError> {
    actions::conference::update(&pool, id, data).await?;
    let detail = Conference::detail(&pool, id)
        .await?
        .ok_or(AppError::NotFound("Conference"))?;
    Ok(Json(detail))
}

#[utoipa::path(
    post,
    path = "/api/conferences/bulk-delete",
    tag = "conferences",
    request_body = BulkRequest,
    responses(
        (status = 200, description = "Selected conferences deleted", body = BulkResponse),
        (status = 409, description = "Confirmation is missing"),
        (status = 422, description = "Empty selection")
    )
)]
pub async fn bulk_delete_conferences(
    State(pool): State<SqlitePool>,
    Json(request): Json<BulkRequest>,
) -> Result<Json<BulkResponse>, AppError> {
    check_bulk_action(&ConferenceResource::table(), "delete", request.confirmed)?;
    let (affected, kind) = actions::conference::bulk_delete(&pool, &request.ids).await?;
    Ok(Json(BulkResponse::new(affected, kind)))
}

#[utoipa::path(
    get,
    path = "/api/conferences/{id}/attendees",
    tag = "conferences",
    params(("id" = i64, Path, description = "Conference ID")),
    responses(
        (status = 200, description = "Attendees signed up for the conference", body = Vec<Attendee>),
        (status = 404, description = "Conference not found")
    )
)]
pub async fn list_attendees(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Attendee>>, AppError> {
    if !Conference::exists(&pool, id).await? {
        return Err(AppError::NotFound("Conference"));
    }
    Ok(Json(Attendee::for_conference(&pool, id).await?))
}
