use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, Sqlite, SqlitePool};
use utoipa::ToSchema;

/// Attendee response model
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Attendee {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub ticket_cost: i64,
    pub is_paid: bool,
    pub conference_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One row of the sign-up repeater.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendeeInput {
    pub name: String,
    pub email: String,
}

/// Fully resolved attendee record, ready to insert.
#[derive(Debug, Clone)]
pub struct NewAttendee {
    pub conference_id: i64,
    pub ticket_cost: i64,
    pub name: String,
    pub email: String,
    pub is_paid: bool,
}

const ATTENDEE_COLUMNS: &str =
    "id, name, email, ticket_cost, is_paid, conference_id, created_at, updated_at";

impl Attendee {
    pub async fn for_conference(pool: &SqlitePool, conference_id: i64) -> Result<Vec<Attendee>, sqlx::Error> {
        sqlx::query_as::<_, Attendee>(&format!(
            "SELECT {ATTENDEE_COLUMNS} FROM attendees WHERE conference_id = ? ORDER BY id"
        ))
        .bind(conference_id)
        .fetch_all(pool)
        .await
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attendees")
            .fetch_one(pool)
            .await
    }

    pub async fn create<'e, E>(executor: E, attendee: &NewAttendee) -> Result<Attendee, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let now = Utc::now();
        sqlx::query_as::<_, Attendee>(&format!(
            r#"
            INSERT INTO attendees (name, email, ticket_cost, is_paid, conference_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING {ATTENDEE_COLUMNS}
            "#
        ))
        .bind(&attendee.name)
        .bind(&attendee.email)
        .bind(attendee.ticket_cost)
        .bind(attendee.is_paid)
        .bind(attendee.conference_id)
        .bind(now)
        .bind(now)
        .fetch_one(executor)
        .await
    }
}
