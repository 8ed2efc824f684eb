//! JSON API under `/api`, guarded by bearer tokens.

pub mod conferences;
pub mod resources;
pub mod signup;
pub mod speakers;
pub mod talks;
pub mod venues;

use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use utoipa::{Modify, OpenApi, ToSchema};

use crate::error::AppError;
use crate::models::*;
use crate::notifications::{Notification, NotificationKind, Severity};
use crate::schema::TableSchema;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/resources/{slug}/schema", get(resources::schema))
        // Talks
        .route("/talks", get(talks::list_talks).post(talks::create_talk))
        .route("/talks/export", get(talks::export_talks))
        .route("/talks/bulk-approve", post(talks::bulk_approve_talks))
        .route("/talks/bulk-delete", post(talks::bulk_delete_talks))
        .route("/talks/{id}", get(talks::get_talk).put(talks::update_talk))
        .route("/talks/{id}/approve", post(talks::approve_talk))
        .route("/talks/{id}/reject", post(talks::reject_talk))
        // Speakers
        .route("/speakers", get(speakers::list_speakers).post(speakers::create_speaker))
        .route("/speakers/bulk-delete", post(speakers::bulk_delete_speakers))
        .route("/speakers/{id}", get(speakers::get_speaker))
        // Conferences
        .route(
            "/conferences",
            get(conferences::list_conferences).post(conferences::create_conference),
        )
        .route("/conferences/bulk-delete", post(conferences::bulk_delete_conferences))
        .route(
            "/conferences/{id}",
            get(conferences::get_conference).put(conferences::update_conference),
        )
        .route("/conferences/{id}/attendees", get(conferences::list_attendees))
        // Venues
        .route("/venues", get(venues::list_venues).post(venues::create_venue))
        .route("/venues/{id}", get(venues::get_venue).put(venues::update_venue))
        // Sign-up
        .route("/signup", post(signup::sign_up))
}

/// Selected record ids of a bulk action.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkRequest {
    pub ids: Vec<i64>,
    /// Required for actions that ask for confirmation
    #[serde(default)]
    pub confirmed: bool,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ConfirmRequest {
    #[serde(default)]
    pub confirmed: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkResponse {
    pub affected: u64,
    pub notification: Notification,
}

impl BulkResponse {
    fn new(affected: u64, kind: NotificationKind) -> Self {
        Self {
            affected,
            notification: kind.notification(),
        }
    }
}

/// Refuse a bulk action the table does not offer, or one that needs a
/// confirmation the caller did not give.
pub(crate) fn check_bulk_action(
    table: &TableSchema,
    action: &str,
    confirmed: bool,
) -> Result<&'static str, AppError> {
    let bulk = table
        .bulk_action(action)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown bulk action: {action}")))?;
    if bulk.requires_confirmation && !confirmed {
        return Err(AppError::ConfirmationRequired(bulk.name));
    }
    Ok(bulk.name)
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "confadmin API", description = "Conference administration back-office"),
    paths(
        resources::schema,
        talks::list_talks,
        talks::create_talk,
        talks::get_talk,
        talks::update_talk,
        talks::approve_talk,
        talks::reject_talk,
        talks::bulk_approve_talks,
        talks::bulk_delete_talks,
        talks::export_talks,
        speakers::list_speakers,
        speakers::create_speaker,
        speakers::get_speaker,
        speakers::bulk_delete_speakers,
        conferences::list_conferences,
        conferences::create_conference,
        conferences::get_conference,
        conferences::update_conference,
        conferences::bulk_delete_conferences,
        conferences::list_attendees,
        venues::list_venues,
        venues::create_venue,
        venues::get_venue,
        venues::update_venue,
        signup::sign_up,
    ),
    components(schemas(
        Talk,
        TalkWithSpeaker,
        TalkInput,
        TalkStatus,
        TalkLength,
        Speaker,
        SpeakerInput,
        Qualification,
        Conference,
        ConferenceListItem,
        ConferenceDetail,
        ConferenceInput,
        ConferenceStatus,
        Venue,
        VenueInput,
        Region,
        Attendee,
        AttendeeInput,
        Notification,
        Severity,
        BulkRequest,
        ConfirmRequest,
        BulkResponse,
        talks::TalkPage,
        talks::TalkActionResponse,
        speakers::SpeakerDetail,
        signup::SignUpRequest,
        signup::SignUpResponse,
    )),
    modifiers(&BearerAuth),
    security(("bearer" = [])),
    tags(
        (name = "resources", description = "Form, table and infolist descriptors"),
        (name = "talks", description = "Talk review"),
        (name = "speakers", description = "Speakers"),
        (name = "conferences", description = "Conferences"),
        (name = "venues", description = "Venues"),
        (name = "signup", description = "Conference sign-up"),
    )
)]
pub struct ApiDoc;
