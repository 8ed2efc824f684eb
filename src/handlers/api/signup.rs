use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::actions;
use crate::config::Config;
use crate::error::AppError;
use crate::models::{Attendee, AttendeeInput};
use crate::notifications::Notification;

/// Attendee rows for the sign-up conference.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SignUpRequest {
    pub attendees: Vec<AttendeeInput>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SignUpResponse {
    pub attendees: Vec<Attendee>,
    /// `"$" + rows × ticket price`
    pub total_price: String,
    pub notification: Notification,
}

#[utoipa::path(
    post,
    path = "/api/signup",
    tag = "signup",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Every attendee signed up and paid", body = SignUpResponse),
        (status = 404, description = "Sign-up conference does not exist"),
        (status = 422, description = "Validation failed; nothing was written")
    )
)]
pub async fn sign_up(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    Json(data): Json<Map<String, Value>>,
) -> Result<(StatusCode, Json<SignUpResponse>), AppError> {
    let outcome = actions::signup::sign_up(&pool, &config, data).await?;
    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            attendees: outcome.attendees,
            total_price: outcome.total_price,
            notification: outcome.notification.notification(),
        }),
    ))
}
