#![allow(dead_code)]

use axum_test::TestServer;
use confadmin::models::{
    Conference, ConferenceInput, ConferenceStatus, Region, Speaker, SpeakerInput, Talk, TalkInput, TalkLength, Venue,
    VenueInput,
};
use confadmin::{router, AppEnv, AppState, Config};
use chrono::NaiveDate;
use sqlx::SqlitePool;
use tempfile::TempDir;

pub const TOKEN: &str = "test-token-0123456789abcdefghijklmnop";

/// Test server plus the handles a test needs to set up data.
pub struct TestApp {
    pub server: TestServer,
    pub pool: SqlitePool,
    /// Keeps the avatar storage alive for the test's duration.
    pub storage: TempDir,
}

pub fn test_config(storage: &TempDir) -> Config {
    Config {
        database_url: String::from("sqlite::memory:"),
        app_env: AppEnv::Testing,
        api_tokens: vec![TOKEN.to_string()],
        storage_dir: storage.path().to_path_buf(),
        signup_conference_id: 1,
        signup_ticket_price: 500,
        ..Config::default()
    }
}

pub async fn setup_with(configure: impl FnOnce(&mut Config)) -> TestApp {
    let pool = confadmin::db::memory_pool()
        .await
        .expect("Failed to create test database pool");
    let storage = TempDir::new().expect("Failed to create storage dir");
    let mut config = test_config(&storage);
    configure(&mut config);

    let app = router(AppState::new(pool.clone(), config));
    let server = TestServer::new(app).expect("Failed to start test server");
    TestApp { server, pool, storage }
}

pub async fn setup() -> TestApp {
    setup_with(|_| {}).await
}

pub fn bearer() -> String {
    format!("Bearer {TOKEN}")
}

pub async fn seed_speaker(pool: &SqlitePool, name: &str) -> Speaker {
    let input = SpeakerInput {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        twitter_handle: None,
        bio: None,
        qualifications: Vec::new(),
    };
    Speaker::create(pool, &input, None).await.expect("seed speaker")
}

pub async fn seed_talk(pool: &SqlitePool, speaker_id: i64, title: &str) -> Talk {
    let input = TalkInput {
        title: title.to_string(),
        abstract_text: format!("About {title}"),
        speaker_id,
        length: TalkLength::Normal,
        new_talk: true,
    };
    Talk::create(pool, &input).await.expect("seed talk")
}

pub async fn seed_venue(pool: &SqlitePool, name: &str, region: Region) -> Venue {
    let input = VenueInput {
        name: name.to_string(),
        city: String::from("Utrecht"),
        country: String::from("Netherlands"),
        postal_code: None,
        region,
    };
    Venue::create(pool, &input).await.expect("seed venue")
}

pub async fn seed_conference(pool: &SqlitePool, name: &str, speakers: Vec<i64>) -> Conference {
    let start = NaiveDate::from_ymd_opt(2025, 10, 9)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .expect("valid date");
    let input = ConferenceInput {
        name: name.to_string(),
        description: String::from("<p>All things Rust</p>"),
        start_date: start,
        end_date: start + chrono::Duration::days(2),
        status: ConferenceStatus::Published,
        region: Region::Eu,
        is_published: true,
        venue_id: None,
        speakers,
        talks: None,
    };
    let mut conn = pool.acquire().await.expect("connection");
    Conference::create(&mut conn, &input).await.expect("seed conference")
}
