use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use utoipa::ToSchema;

use super::{check_bulk_action, BulkRequest, BulkResponse, ConfirmRequest};
use crate::actions;
use crate::error::AppError;
use crate::handlers::web::query_values;
use crate::models::{Talk, TalkInput, TalkWithSpeaker};
use crate::notifications::Notification;
use crate::resources::{talk, Resource, TalkResource};

/// One page of the filtered talk table.
#[derive(Debug, Serialize, ToSchema)]
pub struct TalkPage {
    pub data: Vec<TalkWithSpeaker>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    /// Label of the export header action, e.g. `Export (12)`
    pub export_label: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TalkActionResponse {
    pub talk: Talk,
    pub notification: Notification,
}

#[utoipa::path(
    get,
    path = "/api/talks",
    tag = "talks",
    params(
        ("search" = Option<String>, Query, description = "Matches title or speaker name"),
        ("new_talk" = Option<bool>, Query, description = "Ternary filter on new talks"),
        ("speakers[]" = Option<Vec<i64>>, Query, description = "Only talks of these speakers"),
        ("has_avatar" = Option<bool>, Query, description = "Only speakers with an avatar"),
        ("sort" = Option<String>, Query, description = "title, speaker.name, status, created_at or updated_at"),
        ("direction" = Option<String>, Query, description = "asc or desc"),
        ("page" = Option<u32>, Query, description = "Page number, starting at 1"),
        ("per_page" = Option<u32>, Query, description = "10, 25 or 50"),
    ),
    responses(
        (status = 200, description = "Filtered talks", body = TalkPage),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_talks(
    State(pool): State<SqlitePool>,
    RawQuery(raw): RawQuery,
) -> Result<Json<TalkPage>, AppError> {
    let query = talk::list_query(&query_values(raw));
    let data = Talk::search(&pool, &query).await?;
    let total = Talk::count_matching(&pool, &query).await?;

    Ok(Json(TalkPage {
        data,
        total,
        page: query.page,
        per_page: query.per_page,
        export_label: talk::export_label(total),
    }))
}

#[utoipa::path(
    post,
    path = "/api/talks",
    tag = "talks",
    request_body = TalkInput,
    responses(
        (status = 201, description = "Talk created", body = Talk),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_talk(
    State(pool): State<SqlitePool>,
    Json(data): Json<Map<String, Value>>,
) -> Result<(StatusCode, Json<Talk>), AppError> {
    let talk = actions::talk::create(&pool, data).await?;
    Ok((StatusCode::CREATED, Json(talk)))
}

#[utoipa::path(
    get,
    path = "/api/talks/{id}",
    tag = "talks",
    params(("id" = i64, Path, description = "Talk ID")),
    responses(
        (status = 200, description = "Talk found", body = TalkWithSpeaker),
        (status = 404, description = "Talk not found")
    )
)]
pub async fn get_talk(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<Json<TalkWithSpeaker>, AppError> {
    let talk = Talk::find_with_speaker(&pool, id)
        .await?
        .ok_or(AppError::NotFound("Talk"))?;
    Ok(Json(talk))
}

#[utoipa::path(
    put,
    path = "/api/talks/{id}",
    tag = "talks",
    params(("id" = i64, Path, description = "Talk ID")),
    request_body = TalkInput,
    responses(
        (status = 200, description = "Talk updated", body = Talk),
        (status = 404, description = "Talk not found"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn update_talk(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(data): Json<Map<String, Value>>,
) -> Result<Json<Talk>, AppError> {
    Ok(Json(actions::talk::update(&pool, id, data).await?))
}

#[utoipa::path(
    post,
    path = "/api/talks/{id}/approve",
    tag = "talks",
    params(("id" = i64, Path, description = "Talk ID")),
    responses(
        (status = 200, description = "Talk approved", body = TalkActionResponse),
        (status = 404, description = "Talk not found"),
        (status = 409, description = "Talk is already approved")
    )
)]
pub async fn approve_talk(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<Json<TalkActionResponse>, AppError> {
    let (talk, kind) = actions::talk::approve(&pool, id).await?;
    Ok(Json(TalkActionResponse {
        talk,
        notification: kind.notification(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/talks/{id}/reject",
    tag = "talks",
    params(("id" = i64, Path, description = "Talk ID")),
    request_body = ConfirmRequest,
    responses(
        (status = 200, description = "Talk rejected", body = TalkActionResponse),
        (status = 404, description = "Talk not found"),
        (status = 409, description = "Talk is already rejected, or confirmation is missing")
    )
)]
pub async fn reject_talk(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    body: Bytes,
) -> Result<Json<TalkActionResponse>, AppError> {
    let confirmed = if body.is_empty() {
        false
    } else {
        serde_json::from_slice::<ConfirmRequest>(&body)?.confirmed
    };
    let (talk, kind) = actions::talk::reject(&pool, id, confirmed).await?;
    Ok(Json(TalkActionResponse {
        talk,
        notification: kind.notification(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/talks/bulk-approve",
    tag = "talks",
    request_body = BulkRequest,
    responses(
        (status = 200, description = "Every selected talk approved", body = BulkResponse),
        (status = 404, description = "A selected talk does not exist; nothing changed"),
        (status = 422, description = "Empty selection")
    )
)]
pub async fn bulk_approve_talks(
    State(pool): State<SqlitePool>,
    Json(request): Json<BulkRequest>,
) -> Result<Json<BulkResponse>, AppError> {
    check_bulk_action(&TalkResource::table(), "approve", request.confirmed)?;
    let (affected, kind) = actions::talk::bulk_approve(&pool, &request.ids).await?;
    Ok(Json(BulkResponse::new(affected, kind)))
}

#[utoipa::path(
    post,
    path = "/api/talks/bulk-delete",
    tag = "talks",
    request_body = BulkRequest,
    responses(
        (status = 200, description = "Selected talks deleted", body = BulkResponse),
        (status = 409, description = "Confirmation is missing"),
        (status = 422, description = "Empty selection")
    )
)]
pub async fn bulk_delete_talks(
    State(pool): State<SqlitePool>,
    Json(request): Json<BulkRequest>,
) -> Result<Json<BulkResponse>, AppError> {
    check_bulk_action(&TalkResource::table(), "delete", request.confirmed)?;
    let (affected, kind) = actions::talk::bulk_delete(&pool, &request.ids).await?;
    Ok(Json(BulkResponse::new(affected, kind)))
}

#[utoipa::path(
    get,
    path = "/api/talks/export",
    tag = "talks",
    params(
        ("search" = Option<String>, Query, description = "Same filters as the talk list"),
    ),
    responses(
        (status = 200, description = "CSV of the filtered talks", content_type = "text/csv"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn export_talks(
    State(pool): State<SqlitePool>,
    RawQuery(raw): RawQuery,
) -> Result<impl IntoResponse, AppError> {
    let query = talk::list_query(&query_values(raw));
    let csv = actions::talk::export(&pool, &query).await?;
    Ok(csv_attachment(csv))
}

/// `talks-export.csv` download.
pub(crate) fn csv_attachment(body: Vec<u8>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"talks-export.csv\"",
            ),
        ],
        body,
    )
}
