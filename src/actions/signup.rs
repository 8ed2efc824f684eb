use serde::Deserialize;
use serde_json::{Map, Value};
use sqlx::SqlitePool;

use crate::config::Config;
use crate::error::AppError;
use crate::forms::validated;
use crate::models::{Attendee, AttendeeInput, Conference, NewAttendee};
use crate::notifications::NotificationKind;
use crate::resources::attendee::total_price;
use crate::resources::SignUpForm;

#[derive(Debug, Deserialize)]
struct SignUpInput {
    attendees: Vec<AttendeeInput>,
}

/// Outcome of a sign-up batch.
#[derive(Debug)]
pub struct SignUp {
    pub attendees: Vec<Attendee>,
    pub total_price: String,
    pub notification: NotificationKind,
}

/// Register every attendee row for the configured conference at the
/// configured price. All rows are validated before anything is written and
/// inserted in one transaction.
pub async fn sign_up(pool: &SqlitePool, config: &Config, data: Map<String, Value>) -> Result<SignUp, AppError> {
    let input: SignUpInput = validated(pool, &SignUpForm::form(), data).await?;

    if !Conference::exists(pool, config.signup_conference_id).await? {
        return Err(AppError::NotFound("Conference"));
    }

    let mut tx = pool.begin().await?;
    let mut attendees = Vec::with_capacity(input.attendees.len());
    for row in input.attendees {
        let attendee = Attendee::create(
            &mut *tx,
            &NewAttendee {
                conference_id: config.signup_conference_id,
                ticket_cost: config.signup_ticket_price,
                name: row.name,
                email: row.email,
                is_paid: true,
            },
        )
        .await?;
        attendees.push(attendee);
    }
    tx.commit().await?;

    tracing::info!(
        "Signed up {} attendees for conference {}",
        attendees.len(),
        config.signup_conference_id
    );
    Ok(SignUp {
        total_price: total_price(attendees.len(), config.signup_ticket_price),
        attendees,
        notification: NotificationKind::SignedUp,
    })
}
