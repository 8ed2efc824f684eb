use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool};
use utoipa::ToSchema;

use super::EnumChoice;
use crate::schema::{Color, SortDirection};
use crate::utils::{like_pattern, normalize_search};

/// Review state of a talk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TalkStatus {
    Submitted,
    Approved,
    Rejected,
}

impl Default for TalkStatus {
    fn default() -> Self {
        Self::Submitted
    }
}

impl TalkStatus {
    /// Badge color shown in the talk table.
    pub fn color(self) -> Color {
        match self {
            TalkStatus::Submitted => Color::Primary,
            TalkStatus::Approved => Color::Success,
            TalkStatus::Rejected => Color::Danger,
        }
    }
}

impl EnumChoice for TalkStatus {
    const ALL: &'static [Self] = &[TalkStatus::Submitted, TalkStatus::Approved, TalkStatus::Rejected];

    fn value(self) -> &'static str {
        match self {
            TalkStatus::Submitted => "submitted",
            TalkStatus::Approved => "approved",
            TalkStatus::Rejected => "rejected",
        }
    }

    fn label(self) -> &'static str {
        match self {
            TalkStatus::Submitted => "Submitted",
            TalkStatus::Approved => "Approved",
            TalkStatus::Rejected => "Rejected",
        }
    }
}

/// Slot length of a talk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TalkLength {
    Normal,
    Lightning,
    Keynote,
}

impl Default for TalkLength {
    fn default() -> Self {
        Self::Normal
    }
}

impl TalkLength {
    /// Heroicon used by the length column.
    pub fn icon(self) -> &'static str {
        match self {
            TalkLength::Normal => "heroicon-o-megaphone",
            TalkLength::Lightning => "heroicon-o-bolt",
            TalkLength::Keynote => "heroicon-o-key",
        }
    }
}

impl EnumChoice for TalkLength {
    const ALL: &'static [Self] = &[TalkLength::Normal, TalkLength::Lightning, TalkLength::Keynote];

    fn value(self) -> &'static str {
        match self {
            TalkLength::Normal => "normal",
            TalkLength::Lightning => "lightning",
            TalkLength::Keynote => "keynote",
        }
    }

    fn label(self) -> &'static str {
        match self {
            TalkLength::Normal => "Normal - 30 Minutes",
            TalkLength::Lightning => "Lightning - 15 Minutes",
            TalkLength::Keynote => "Keynote",
        }
    }
}

/// Talk response model
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Talk {
    pub id: i64,
    pub title: String,
    #[serde(skip)]
    pub normalized_title: String,
    #[sqlx(rename = "abstract")]
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub status: TalkStatus,
    pub length: TalkLength,
    pub new_talk: bool,
    pub speaker_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Talk joined with the columns of its speaker that the table shows.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct TalkWithSpeaker {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub talk: Talk,
    pub speaker_name: String,
    pub speaker_avatar: Option<String>,
}

/// Payload of the talk form, shared by create and edit.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TalkInput {
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub speaker_id: i64,
    #[serde(default)]
    pub length: TalkLength,
    #[serde(default = "default_new_talk")]
    pub new_talk: bool,
}

fn default_new_talk() -> bool {
    true
}

/// Sortable talk table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TalkSort {
    Title,
    SpeakerName,
    Status,
    CreatedAt,
    UpdatedAt,
}

impl TalkSort {
    pub fn from_column(column: &str) -> Option<Self> {
        match column {
            "title" => Some(TalkSort::Title),
            "speaker.name" | "speaker_name" => Some(TalkSort::SpeakerName),
            "status" => Some(TalkSort::Status),
            "created_at" => Some(TalkSort::CreatedAt),
            "updated_at" => Some(TalkSort::UpdatedAt),
            _ => None,
        }
    }

    fn sql(self) -> &'static str {
        match self {
            TalkSort::Title => "t.title",
            TalkSort::SpeakerName => "s.name",
            TalkSort::Status => "t.status",
            TalkSort::CreatedAt => "t.created_at",
            TalkSort::UpdatedAt => "t.updated_at",
        }
    }
}

/// Search, filter, sort and page state of the talk table.
#[derive(Debug, Clone, PartialEq)]
pub struct TalkListQuery {
    pub search: Option<String>,
    /// Ternary filter: `None` shows all talks.
    pub new_talk: Option<bool>,
    /// Multi-select speaker filter: empty shows all speakers.
    pub speakers: Vec<i64>,
    /// Only talks whose speaker uploaded an avatar.
    pub has_avatar: bool,
    pub sort: Option<TalkSort>,
    pub direction: SortDirection,
    pub page: u32,
    pub per_page: u32,
}

impl Default for TalkListQuery {
    fn default() -> Self {
        Self {
            search: None,
            new_talk: None,
            speakers: Vec::new(),
            has_avatar: false,
            sort: None,
            direction: SortDirection::Asc,
            page: 1,
            per_page: 10,
        }
    }
}

impl TalkListQuery {
    fn push_filters(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        qb.push(" FROM talks t JOIN speakers s ON s.id = t.speaker_id WHERE 1 = 1");

        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let pattern = like_pattern(search);
            qb.push(" AND (t.normalized_title LIKE ")
                .push_bind(pattern.clone())
                .push(r" ESCAPE '\' OR s.normalized_name LIKE ")
                .push_bind(pattern)
                .push(r" ESCAPE '\')");
        }

        if let Some(new_talk) = self.new_talk {
            qb.push(" AND t.new_talk = ").push_bind(new_talk);
        }

        if !self.speakers.is_empty() {
            qb.push(" AND t.speaker_id IN (");
            let mut separated = qb.separated(", ");
            for id in &self.speakers {
                separated.push_bind(*id);
            }
            separated.push_unseparated(")");
        }

        if self.has_avatar {
            qb.push(" AND s.avatar IS NOT NULL");
        }
    }

    fn push_order(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        let direction = self.direction.sql();
        match self.sort {
            Some(sort) => {
                qb.push(format!(" ORDER BY {} {}, t.id {}", sort.sql(), direction, direction));
            }
            None => {
                qb.push(" ORDER BY t.id DESC");
            }
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page.max(1) - 1) * i64::from(self.per_page)
    }
}

const TALK_COLUMNS: &str = "t.id, t.title, t.normalized_title, t.abstract, t.status, t.length, \
     t.new_talk, t.speaker_id, t.created_at, t.updated_at, \
     s.name AS speaker_name, s.avatar AS speaker_avatar";

impl Talk {
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Talk>, sqlx::Error> {
        sqlx::query_as::<_, Talk>(
            r#"
            SELECT id, title, normalized_title, abstract, status, length,
                   new_talk, speaker_id, created_at, updated_at
            FROM talks
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_with_speaker(
        pool: &SqlitePool,
        id: i64,
    ) -> Result<Option<TalkWithSpeaker>, sqlx::Error> {
        sqlx::query_as::<_, TalkWithSpeaker>(&format!(
            "SELECT {TALK_COLUMNS} FROM talks t JOIN speakers s ON s.id = t.speaker_id WHERE t.id = ?"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn for_speaker(pool: &SqlitePool, speaker_id: i64) -> Result<Vec<Talk>, sqlx::Error> {
        sqlx::query_as::<_, Talk>(
            r#"
            SELECT id, title, normalized_title, abstract, status, length,
                   new_talk, speaker_id, created_at, updated_at
            FROM talks
            WHERE speaker_id = ?
            ORDER BY id
            "#,
        )
        .bind(speaker_id)
        .fetch_all(pool)
        .await
    }

    /// One page of the talk table.
    pub async fn search(
        pool: &SqlitePool,
        query: &TalkListQuery,
    ) -> Result<Vec<TalkWithSpeaker>, sqlx::Error> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {TALK_COLUMNS}"));
        query.push_filters(&mut qb);
        query.push_order(&mut qb);
        qb.push(" LIMIT ")
            .push_bind(i64::from(query.per_page))
            .push(" OFFSET ")
            .push_bind(query.offset());

        tracing::debug!("Talk table query: {}", qb.sql());
        qb.build_query_as::<TalkWithSpeaker>().fetch_all(pool).await
    }

    /// Every talk matching the filters, ignoring pagination.
    pub async fn search_all(
        pool: &SqlitePool,
        query: &TalkListQuery,
    ) -> Result<Vec<TalkWithSpeaker>, sqlx::Error> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {TALK_COLUMNS}"));
        query.push_filters(&mut qb);
        query.push_order(&mut qb);
        qb.build_query_as::<TalkWithSpeaker>().fetch_all(pool).await
    }

    pub async fn count_matching(pool: &SqlitePool, query: &TalkListQuery) -> Result<i64, sqlx::Error> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*)");
        query.push_filters(&mut qb);
        qb.build_query_scalar::<i64>().fetch_one(pool).await
    }

    pub async fn create<'e, E>(executor: E, input: &TalkInput) -> Result<Talk, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let now = Utc::now();
        sqlx::query_as::<_, Talk>(
            r#"
            INSERT INTO talks (
                title, normalized_title, abstract, status, length,
                new_talk, speaker_id, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, title, normalized_title, abstract, status, length,
                      new_talk, speaker_id, created_at, updated_at
            "#,
        )
        .bind(&input.title)
        .bind(normalize_search(&input.title))
        .bind(&input.abstract_text)
        .bind(TalkStatus::Submitted)
        .bind(input.length)
        .bind(input.new_talk)
        .bind(input.speaker_id)
        .bind(now)
        .bind(now)
        .fetch_one(executor)
        .await
    }

    pub async fn update<'e, E>(executor: E, id: i64, input: &TalkInput) -> Result<Option<Talk>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Talk>(
            r#"
            UPDATE talks
            SET title = ?, normalized_title = ?, abstract = ?, length = ?,
                new_talk = ?, speaker_id = ?, updated_at = ?
            WHERE id = ?
            RETURNING id, title, normalized_title, abstract, status, length,
                      new_talk, speaker_id, created_at, updated_at
            "#,
        )
        .bind(&input.title)
        .bind(normalize_search(&input.title))
        .bind(&input.abstract_text)
        .bind(input.length)
        .bind(input.new_talk)
        .bind(input.speaker_id)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Unconditionally set the status; returns false when the talk does not exist.
    pub async fn set_status<'e, E>(executor: E, id: i64, status: TalkStatus) -> Result<bool, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("UPDATE talks SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status)
            .bind(Utc::now())
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn approve<'e, E>(executor: E, id: i64) -> Result<bool, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        Self::set_status(executor, id, TalkStatus::Approved).await
    }

    pub async fn reject<'e, E>(executor: E, id: i64) -> Result<bool, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        Self::set_status(executor, id, TalkStatus::Rejected).await
    }

    pub async fn delete_many<'e, E>(executor: E, ids: &[i64]) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        if ids.is_empty() {
            return Ok(0);
        }
        let mut qb = QueryBuilder::<Sqlite>::new("DELETE FROM talks WHERE id IN (");
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
        let result = qb.build().execute(executor).await?;
        Ok(result.rows_affected())
    }
}
