use std::sync::Arc;

use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use utoipa::ToSchema;

use super::{check_bulk_action, BulkRequest, BulkResponse};
use crate::actions;
use crate::config::Config;
use crate::error::AppError;
use crate::forms::FormValues;
use crate::models::{has_spoken, Speaker, SpeakerInput, Talk};
use crate::resources::{speaker, Resource, SpeakerResource};

/// Speaker with the derived fields of the view page.
#[derive(Debug, Serialize, ToSchema)]
pub struct SpeakerDetail {
    #[serde(flatten)]
    pub speaker: Speaker,
    pub avatar_url: String,
    pub has_spoken: bool,
    pub talks: Vec<Talk>,
}

#[utoipa::path(
    get,
    path = "/api/speakers",
    tag = "speakers",
    params(
        ("search" = Option<String>, Query, description = "Matches name, email or Twitter handle"),
        ("sort" = Option<String>, Query, description = "created_at or updated_at"),
        ("direction" = Option<String>, Query, description = "asc or desc"),
    ),
    responses(
        (status = 200, description = "List speakers", body = Vec<Speaker>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_speakers(
    State(pool): State<SqlitePool>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Vec<Speaker>>, AppError> {
    let query = speaker::list_query(&FormValues::parse(raw.unwrap_or_default().as_bytes()));
    Ok(Json(Speaker::search(&pool, &query).await?))
}

#[utoipa::path(
    post,
    path = "/api/speakers",
    tag = "speakers",
    request_body = SpeakerInput,
    responses(
        (status = 201, description = "Speaker created", body = Speaker),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_speaker(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    Json(data): Json<Map<String, Value>>,
) -> Result<(StatusCode, Json<Speaker>), AppError> {
    let speaker = actions::speaker::create(&pool, &config.storage_dir, data, None).await?;
    Ok((StatusCode::CREATED, Json(speaker)))
}

#[utoipa::path(
    get,
    path = "/api/speakers/{id}",
    tag = "speakers",
    params(("id" = i64, Path, description = "Speaker ID")),
    responses(
        (status = 200, description = "Speaker found", body = SpeakerDetail),
        (status = 404, description = "Speaker not found")
    )
)]
pub async fn get_speaker(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<Json<SpeakerDetail>, AppError> {
    let speaker = Speaker::find_by_id(&pool, id)
        .await?
        .ok_or(AppError::NotFound("Speaker"))?;
    let talks = Talk::for_speaker(&pool, id).await?;

    Ok(Json(SpeakerDetail {
        avatar_url: speaker::avatar_url(speaker.avatar.as_deref(), &speaker.name),
        has_spoken: has_spoken(&talks),
        speaker,
        talks,
    }))
}

#[utoipa::path(
    post,
    path = "/api/speakers/bulk-delete",
    tag = "speakers",
    request_body = BulkRequest,
    responses(
        (status = 200, description = "Selected speakers deleted with their talks", body = BulkResponse),
        (status = 409, description = "Confirmation is missing"),
        (status = 422, description = "Empty selection")
    )
)]
pub async fn bulk_delete_speakers(
    State(pool): State<SqlitePool>,
    Json(request): Json<BulkRequest>,
) -> Result<Json<BulkResponse>, AppError> {
    check_bulk_action(&SpeakerResource::table(), "delete", request.confirmed)?;
    let (affected, kind) = actions::speaker::bulk_delete(&pool, &request.ids).await?;
    Ok(Json(BulkResponse::new(affected, kind)))
}
