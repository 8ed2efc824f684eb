use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use utoipa::ToSchema;

use super::{EnumChoice, Region};
use crate::schema::Color;

/// Publication state of a conference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConferenceStatus {
    Draft,
    Published,
    Archived,
}

impl ConferenceStatus {
    pub fn color(self) -> Color {
        match self {
            ConferenceStatus::Draft => Color::Gray,
            ConferenceStatus::Published => Color::Success,
            ConferenceStatus::Archived => Color::Warning,
        }
    }
}

impl EnumChoice for ConferenceStatus {
    const ALL: &'static [Self] = &[
        ConferenceStatus::Draft,
        ConferenceStatus::Published,
        ConferenceStatus::Archived,
    ];

    fn value(self) -> &'static str {
        match self {
            ConferenceStatus::Draft => "draft",
            ConferenceStatus::Published => "published",
            ConferenceStatus::Archived => "archived",
        }
    }

    fn label(self) -> &'static str {
        match self {
            ConferenceStatus::Draft => "Draft",
            ConferenceStatus::Published => "Published",
            ConferenceStatus::Archived => "Archived",
        }
    }
}

/// Conference response model (matches database schema)
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Conference {
    pub id: i64,
    pub name: String,
    /// Rich text (HTML)
    pub description: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub status: ConferenceStatus,
    pub region: Region,
    pub is_published: bool,
    pub venue_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Conference row of the admin table, with the venue name resolved.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct ConferenceListItem {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub conference: Conference,
    pub venue_name: Option<String>,
    pub speaker_count: i64,
}

/// Conference with its relationship ids, as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConferenceDetail {
    #[serde(flatten)]
    pub conference: Conference,
    pub speakers: Vec<i64>,
    pub talks: Vec<i64>,
}

/// Payload of the conference form, shared by create and edit.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConferenceInput {
    pub name: String,
    pub description: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub status: ConferenceStatus,
    pub region: Region,
    #[serde(default = "default_is_published")]
    pub is_published: bool,
    pub venue_id: Option<i64>,
    /// Speaker ids (required, at least one)
    #[serde(default)]
    pub speakers: Vec<i64>,
    /// Talk ids attached to the conference; left untouched when absent
    #[serde(default)]
    pub talks: Option<Vec<i64>>,
}

fn default_is_published() -> bool {
    true
}

const CONFERENCE_COLUMNS: &str = "c.id, c.name, c.description, c.start_date, c.end_date, c.status, \
     c.region, c.is_published, c.venue_id, c.created_at, c.updated_at";

impl Conference {
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Conference>, sqlx::Error> {
        sqlx::query_as::<_, Conference>(&format!(
            "SELECT {CONFERENCE_COLUMNS} FROM conferences c WHERE c.id = ?"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn exists(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM conferences WHERE id = ?)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<ConferenceListItem>, sqlx::Error> {
        sqlx::query_as::<_, ConferenceListItem>(&format!(
            r#"
            SELECT {CONFERENCE_COLUMNS},
                   v.name AS venue_name,
                   (SELECT COUNT(*) FROM conference_speaker cs WHERE cs.conference_id = c.id) AS speaker_count
            FROM conferences c
            LEFT JOIN venues v ON v.id = c.venue_id
            ORDER BY c.start_date DESC, c.id DESC
            "#
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn detail(pool: &SqlitePool, id: i64) -> Result<Option<ConferenceDetail>, sqlx::Error> {
        let Some(conference) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let speakers = Self::speaker_ids(pool, id).await?;
        let talks = Self::talk_ids(pool, id).await?;
        Ok(Some(ConferenceDetail {
            conference,
            speakers,
            talks,
        }))
    }

    pub async fn speaker_ids(pool: &SqlitePool, id: i64) -> Result<Vec<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT speaker_id FROM conference_speaker WHERE conference_id = ? ORDER BY speaker_id",
        )
        .bind(id)
        .fetch_all(pool)
        .await
    }

    pub async fn talk_ids(pool: &SqlitePool, id: i64) -> Result<Vec<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT talk_id FROM conference_talk WHERE conference_id = ? ORDER BY talk_id",
        )
        .bind(id)
        .fetch_all(pool)
        .await
    }

    /// Insert the conference and its speaker/talk links. Run inside a transaction.
    pub async fn create(conn: &mut SqliteConnection, input: &ConferenceInput) -> Result<Conference, sqlx::Error> {
        let now = Utc::now();
        let conference = sqlx::query_as::<_, Conference>(
            r#"
            INSERT INTO conferences (
                name, description, start_date, end_date, status, region,
                is_published, venue_id, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, name, description, start_date, end_date, status,
                      region, is_published, venue_id, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.status)
        .bind(input.region)
        .bind(input.is_published)
        .bind(input.venue_id)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;

        sync_links(conn, "conference_speaker", "speaker_id", conference.id, &input.speakers).await?;
        if let Some(talks) = &input.talks {
            sync_links(conn, "conference_talk", "talk_id", conference.id, talks).await?;
        }

        Ok(conference)
    }

    /// Update the conference and replace its speaker/talk links. Run inside a transaction.
    pub async fn update(
        conn: &mut SqliteConnection,
        id: i64,
        input: &ConferenceInput,
    ) -> Result<Option<Conference>, sqlx::Error> {
        let conference = sqlx::query_as::<_, Conference>(
            r#"
            UPDATE conferences
            SET name = ?, description = ?, start_date = ?, end_date = ?, status = ?,
                region = ?, is_published = ?, venue_id = ?, updated_at = ?
            WHERE id = ?
            RETURNING id, name, description, start_date, end_date, status,
                      region, is_published, venue_id, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.status)
        .bind(input.region)
        .bind(input.is_published)
        .bind(input.venue_id)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        let Some(conference) = conference else {
            return Ok(None);
        };

        sync_links(conn, "conference_speaker", "speaker_id", id, &input.speakers).await?;
        if let Some(talks) = &input.talks {
            sync_links(conn, "conference_talk", "talk_id", id, talks).await?;
        }

        Ok(Some(conference))
    }

    pub async fn delete_many(conn: &mut SqliteConnection, ids: &[i64]) -> Result<u64, sqlx::Error> {
        if ids.is_empty() {
            return Ok(0);
        }
        let mut qb = QueryBuilder::<Sqlite>::new("DELETE FROM conferences WHERE id IN (");
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
        let result = qb.build().execute(&mut *conn).await?;
        Ok(result.rows_affected())
    }
}

/// Replace the rows of a conference pivot table with `ids`.
async fn sync_links(
    conn: &mut SqliteConnection,
    table: &'static str,
    column: &'static str,
    conference_id: i64,
    ids: &[i64],
) -> Result<(), sqlx::Error> {
    sqlx::query(&format!("DELETE FROM {table} WHERE conference_id = ?"))
        .bind(conference_id)
        .execute(&mut *conn)
        .await?;

    if ids.is_empty() {
        return Ok(());
    }

    let mut qb = QueryBuilder::<Sqlite>::new(format!("INSERT OR IGNORE INTO {table} (conference_id, {column}) "));
    qb.push_values(ids, |mut row, id| {
        row.push_bind(conference_id).push_bind(*id);
    });
    qb.build().execute(&mut *conn).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;
    use crate::models::{Speaker, SpeakerInput};
    use chrono::NaiveDate;

    fn input(speakers: Vec<i64>) -> ConferenceInput {
        let start = NaiveDate::from_ymd_opt(2025, 5, 20)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        ConferenceInput {
            name: "RustConf".into(),
            description: "<p>Rust</p>".into(),
            start_date: start,
            end_date: start + chrono::Duration::days(2),
            status: ConferenceStatus::Draft,
            region: Region::Us,
            is_published: true,
            venue_id: None,
            speakers,
            talks: None,
        }
    }

    async fn speaker(pool: &SqlitePool, name: &str) -> i64 {
        Speaker::create(
            pool,
            &SpeakerInput {
                name: name.into(),
                email: "s@example.com".into(),
                twitter_handle: None,
                bio: None,
                qualifications: Vec::new(),
            },
            None,
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_create_links_speakers() {
        let pool = memory_pool().await.unwrap();
        let a = speaker(&pool, "A").await;
        let b = speaker(&pool, "B").await;

        let mut tx = pool.begin().await.unwrap();
        let conference = Conference::create(&mut tx, &input(vec![b, a, a])).await.unwrap();
        tx.commit().await.unwrap();

        let detail = Conference::detail(&pool, conference.id).await.unwrap().unwrap();
        assert_eq!(detail.speakers, vec![a, b]);
        assert_eq!(detail.conference.start_date, input(vec![]).start_date);

        let listed = Conference::find_all(&pool).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].speaker_count, 2);
        assert!(listed[0].venue_name.is_none());
    }

    #[tokio::test]
    async fn test_update_replaces_links() {
        let pool = memory_pool().await.unwrap();
        let a = speaker(&pool, "A").await;
        let b = speaker(&pool, "B").await;

        let mut conn = pool.acquire().await.unwrap();
        let conference = Conference::create(&mut conn, &input(vec![a])).await.unwrap();
        let mut changed = input(vec![b]);
        changed.status = ConferenceStatus::Published;
        let updated = Conference::update(&mut conn, conference.id, &changed)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, ConferenceStatus::Published);
        drop(conn);

        assert_eq!(Conference::speaker_ids(&pool, conference.id).await.unwrap(), vec![b]);
        assert!(Conference::exists(&pool, conference.id).await.unwrap());
        assert!(!Conference::exists(&pool, 77).await.unwrap());
    }
}
