use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool};
use utoipa::ToSchema;

use super::{EnumChoice, Talk, TalkStatus};
use crate::schema::SortDirection;
use crate::utils::{like_pattern, normalize_search};

/// Background tag a speaker can be credited with.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum Qualification {
    BusinessLeader,
    Charisma,
    FirstTime,
    HometownHero,
    Humanitarian,
    LaracastsContributor,
    TwitterInfluencer,
    YoutubeInfluencer,
    OpenSource,
    UniquePerspective,
}

impl Qualification {
    /// Helper text shown under the checkbox.
    pub fn description(self) -> &'static str {
        match self {
            Qualification::BusinessLeader => "Business Leader Description",
            Qualification::Charisma => "Charismatic Speaker Description",
            Qualification::FirstTime => "First Time Speaker Description",
            Qualification::HometownHero => "Hometown Hero Description",
            Qualification::Humanitarian => "Works in Humanitarian Field Description",
            Qualification::LaracastsContributor => "Laracasts Contributor Description",
            Qualification::TwitterInfluencer => "Large Twitter Following Description",
            Qualification::YoutubeInfluencer => "Large Youtube Following Description",
            Qualification::OpenSource => "Open Source Creator / Maintainer Description",
            Qualification::UniquePerspective => "Unique Perspective Description",
        }
    }
}

impl EnumChoice for Qualification {
    const ALL: &'static [Self] = &[
        Qualification::BusinessLeader,
        Qualification::Charisma,
        Qualification::FirstTime,
        Qualification::HometownHero,
        Qualification::Humanitarian,
        Qualification::LaracastsContributor,
        Qualification::TwitterInfluencer,
        Qualification::YoutubeInfluencer,
        Qualification::OpenSource,
        Qualification::UniquePerspective,
    ];

    fn value(self) -> &'static str {
        match self {
            Qualification::BusinessLeader => "business-leader",
            Qualification::Charisma => "charisma",
            Qualification::FirstTime => "first-time",
            Qualification::HometownHero => "hometown-hero",
            Qualification::Humanitarian => "humanitarian",
            Qualification::LaracastsContributor => "laracasts-contributor",
            Qualification::TwitterInfluencer => "twitter-influencer",
            Qualification::YoutubeInfluencer => "youtube-influencer",
            Qualification::OpenSource => "open-source",
            Qualification::UniquePerspective => "unique-perspective",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Qualification::BusinessLeader => "Business Leader",
            Qualification::Charisma => "Charismatic Speaker",
            Qualification::FirstTime => "First Time Speaker",
            Qualification::HometownHero => "Hometown Hero",
            Qualification::Humanitarian => "Works in Humanitarian Field",
            Qualification::LaracastsContributor => "Laracasts Contributor",
            Qualification::TwitterInfluencer => "Large Twitter Following",
            Qualification::YoutubeInfluencer => "Large YouTube Following",
            Qualification::OpenSource => "Open Source Creator / Maintainer",
            Qualification::UniquePerspective => "Unique Perspective",
        }
    }
}

/// Speaker response model
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Speaker {
    pub id: i64,
    pub name: String,
    #[serde(skip)]
    pub normalized_name: String,
    pub email: String,
    pub twitter_handle: Option<String>,
    pub bio: Option<String>,
    /// Path of the uploaded avatar below the storage directory
    pub avatar: Option<String>,
    #[schema(value_type = Vec<Qualification>)]
    pub qualifications: Json<BTreeSet<Qualification>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload of the speaker form. The avatar travels separately as an upload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SpeakerInput {
    pub name: String,
    pub email: String,
    pub twitter_handle: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub qualifications: Vec<Qualification>,
}

/// Search and sort state of the speaker table.
#[derive(Debug, Clone, Default)]
pub struct SpeakerListQuery {
    pub search: Option<String>,
    pub sort: Option<SpeakerSort>,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakerSort {
    CreatedAt,
    UpdatedAt,
}

impl SpeakerSort {
    pub fn from_column(column: &str) -> Option<Self> {
        match column {
            "created_at" => Some(SpeakerSort::CreatedAt),
            "updated_at" => Some(SpeakerSort::UpdatedAt),
            _ => None,
        }
    }

    fn sql(self) -> &'static str {
        match self {
            SpeakerSort::CreatedAt => "created_at",
            SpeakerSort::UpdatedAt => "updated_at",
        }
    }
}

const SPEAKER_COLUMNS: &str = "id, name, normalized_name, email, twitter_handle, bio, avatar, \
     qualifications, created_at, updated_at";

/// True when at least one of the talks has been approved.
pub fn has_spoken(talks: &[Talk]) -> bool {
    talks.iter().any(|t| t.status == TalkStatus::Approved)
}

impl Speaker {
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Speaker>, sqlx::Error> {
        sqlx::query_as::<_, Speaker>(&format!("SELECT {SPEAKER_COLUMNS} FROM speakers WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn search(pool: &SqlitePool, query: &SpeakerListQuery) -> Result<Vec<Speaker>, sqlx::Error> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {SPEAKER_COLUMNS} FROM speakers WHERE 1 = 1"));

        if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let pattern = like_pattern(search);
            qb.push(" AND (normalized_name LIKE ")
                .push_bind(pattern.clone())
                .push(r" ESCAPE '\' OR lower(email) LIKE ")
                .push_bind(pattern.clone())
                .push(r" ESCAPE '\' OR lower(twitter_handle) LIKE ")
                .push_bind(pattern)
                .push(r" ESCAPE '\')");
        }

        match query.sort {
            Some(sort) => {
                qb.push(format!(" ORDER BY {} {}, id", sort.sql(), query.direction.sql()));
            }
            None => {
                qb.push(" ORDER BY name, id");
            }
        }

        qb.build_query_as::<Speaker>().fetch_all(pool).await
    }

    /// `(id, name)` pairs for relationship selects.
    pub async fn options(pool: &SqlitePool) -> Result<Vec<(i64, String)>, sqlx::Error> {
        sqlx::query_as::<_, (i64, String)>("SELECT id, name FROM speakers ORDER BY name, id")
            .fetch_all(pool)
            .await
    }

    pub async fn create<'e, E>(
        executor: E,
        input: &SpeakerInput,
        avatar: Option<String>,
    ) -> Result<Speaker, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let now = Utc::now();
        let qualifications: BTreeSet<Qualification> = input.qualifications.iter().copied().collect();
        sqlx::query_as::<_, Speaker>(&format!(
            r#"
            INSERT INTO speakers (
                name, normalized_name, email, twitter_handle, bio, avatar,
                qualifications, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {SPEAKER_COLUMNS}
            "#
        ))
        .bind(&input.name)
        .bind(normalize_search(&input.name))
        .bind(&input.email)
        .bind(input.twitter_handle.as_deref().filter(|h| !h.is_empty()))
        .bind(input.bio.as_deref().filter(|b| !b.is_empty()))
        .bind(avatar)
        .bind(Json(qualifications))
        .bind(now)
        .bind(now)
        .fetch_one(executor)
        .await
    }

    pub async fn delete_many<'e, E>(executor: E, ids: &[i64]) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        if ids.is_empty() {
            return Ok(0);
        }
        let mut qb = QueryBuilder::<Sqlite>::new("DELETE FROM speakers WHERE id IN (");
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
        let result = qb.build().execute(executor).await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;
    use crate::models::{TalkInput, TalkLength};

    fn speaker_input(name: &str) -> SpeakerInput {
        SpeakerInput {
            name: name.to_string(),
            email: "speaker@example.com".to_string(),
            twitter_handle: Some("speaker".to_string()),
            bio: Some("<p>Bio</p>".to_string()),
            qualifications: vec![
                Qualification::OpenSource,
                Qualification::Charisma,
                Qualification::OpenSource,
            ],
        }
    }

    #[test]
    fn test_vocabulary_has_ten_described_entries() {
        assert_eq!(Qualification::ALL.len(), 10);
        for q in Qualification::ALL {
            assert!(q.description().starts_with(q.label().split(' ').next().unwrap()));
            assert_eq!(Qualification::from_value(q.value()), Some(*q));
        }
    }

    #[test]
    fn test_qualification_serde_values() {
        assert_eq!(
            serde_json::to_string(&Qualification::LaracastsContributor).unwrap(),
            "\"laracasts-contributor\""
        );
    }

    #[tokio::test]
    async fn test_create_deduplicates_qualifications() {
        let pool = memory_pool().await.unwrap();
        let speaker = Speaker::create(&pool, &speaker_input("Grace Hopper"), None)
            .await
            .unwrap();
        assert_eq!(speaker.qualifications.0.len(), 2);
        assert!(speaker.qualifications.0.contains(&Qualification::OpenSource));
        assert_eq!(speaker.normalized_name, "grace hopper");

        let fetched = Speaker::find_by_id(&pool, speaker.id).await.unwrap().unwrap();
        assert_eq!(fetched.qualifications, speaker.qualifications);
    }

    #[tokio::test]
    async fn test_has_spoken_follows_approved_talks() {
        let pool = memory_pool().await.unwrap();
        let speaker = Speaker::create(&pool, &speaker_input("Grace Hopper"), None)
            .await
            .unwrap();
        assert!(!has_spoken(&Talk::for_speaker(&pool, speaker.id).await.unwrap()));

        let talk = Talk::create(
            &pool,
            &TalkInput {
                title: "COBOL".into(),
                abstract_text: "Compilers".into(),
                speaker_id: speaker.id,
                length: TalkLength::Keynote,
                new_talk: false,
            },
        )
        .await
        .unwrap();
        assert!(!has_spoken(&Talk::for_speaker(&pool, speaker.id).await.unwrap()));

        Talk::reject(&pool, talk.id).await.unwrap();
        assert!(!has_spoken(&Talk::for_speaker(&pool, speaker.id).await.unwrap()));

        Talk::approve(&pool, talk.id).await.unwrap();
        assert!(has_spoken(&Talk::for_speaker(&pool, speaker.id).await.unwrap()));
    }

    #[tokio::test]
    async fn test_search_matches_name_email_and_twitter() {
        let pool = memory_pool().await.unwrap();
        Speaker::create(&pool, &speaker_input("Grace Hopper"), None).await.unwrap();
        let mut other = speaker_input("Alan Turing");
        other.email = "alan@bletchley.uk".into();
        other.twitter_handle = Some("enigma".into());
        Speaker::create(&pool, &other, None).await.unwrap();

        for term in ["turing", "BLETCHLEY", "enig"] {
            let rows = Speaker::search(
                &pool,
                &SpeakerListQuery {
                    search: Some(term.into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
            assert_eq!(rows.len(), 1, "search {term}");
            assert_eq!(rows[0].name, "Alan Turing");
        }
    }

    #[tokio::test]
    async fn test_deleting_speaker_cascades_to_talks() {
        let pool = memory_pool().await.unwrap();
        let speaker = Speaker::create(&pool, &speaker_input("Grace Hopper"), None)
            .await
            .unwrap();
        Talk::create(
            &pool,
            &TalkInput {
                title: "Nanoseconds".into(),
                abstract_text: "Wire".into(),
                speaker_id: speaker.id,
                length: TalkLength::Normal,
                new_talk: true,
            },
        )
        .await
        .unwrap();

        assert_eq!(Speaker::delete_many(&pool, &[speaker.id]).await.unwrap(), 1);
        assert!(Talk::for_speaker(&pool, speaker.id).await.unwrap().is_empty());
    }
}
