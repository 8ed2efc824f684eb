use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, Sqlite, SqlitePool};
use utoipa::ToSchema;

use super::Region;

/// Venue response model
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Venue {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub country: String,
    pub postal_code: Option<String>,
    pub region: Region,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload of the venue form, used standalone and from the conference form.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VenueInput {
    pub name: String,
    pub city: String,
    pub country: String,
    pub postal_code: Option<String>,
    pub region: Region,
}

const VENUE_COLUMNS: &str = "id, name, city, country, postal_code, region, created_at, updated_at";

impl Venue {
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Venue>, sqlx::Error> {
        sqlx::query_as::<_, Venue>(&format!("SELECT {VENUE_COLUMNS} FROM venues WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All venues, optionally restricted to one region.
    pub async fn find_all(pool: &SqlitePool, region: Option<Region>) -> Result<Vec<Venue>, sqlx::Error> {
        match region {
            Some(region) => {
                sqlx::query_as::<_, Venue>(&format!(
                    "SELECT {VENUE_COLUMNS} FROM venues WHERE region = ? ORDER BY name, id"
                ))
                .bind(region)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Venue>(&format!(
                    "SELECT {VENUE_COLUMNS} FROM venues ORDER BY name, id"
                ))
                .fetch_all(pool)
                .await
            }
        }
    }

    /// `(id, name)` pairs for the venue select, which only offers venues of the chosen region.
    pub async fn options(pool: &SqlitePool, region: Option<Region>) -> Result<Vec<(i64, String)>, sqlx::Error> {
        let Some(region) = region else {
            return Ok(Vec::new());
        };
        sqlx::query_as::<_, (i64, String)>("SELECT id, name FROM venues WHERE region = ? ORDER BY name, id")
            .bind(region)
            .fetch_all(pool)
            .await
    }

    pub async fn create<'e, E>(executor: E, input: &VenueInput) -> Result<Venue, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let now = Utc::now();
        sqlx::query_as::<_, Venue>(&format!(
            r#"
            INSERT INTO venues (name, city, country, postal_code, region, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING {VENUE_COLUMNS}
            "#
        ))
        .bind(&input.name)
        .bind(&input.city)
        .bind(&input.country)
        .bind(input.postal_code.as_deref().filter(|p| !p.is_empty()))
        .bind(input.region)
        .bind(now)
        .bind(now)
        .fetch_one(executor)
        .await
    }

    pub async fn update<'e, E>(executor: E, id: i64, input: &VenueInput) -> Result<Option<Venue>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Venue>(&format!(
            r#"
            UPDATE venues
            SET name = ?, city = ?, country = ?, postal_code = ?, region = ?, updated_at = ?
            WHERE id = ?
            RETURNING {VENUE_COLUMNS}
            "#
        ))
        .bind(&input.name)
        .bind(&input.city)
        .bind(&input.country)
        .bind(input.postal_code.as_deref().filter(|p| !p.is_empty()))
        .bind(input.region)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(executor)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;

    fn venue(name: &str, region: Region) -> VenueInput {
        VenueInput {
            name: name.to_string(),
            city: "City".to_string(),
            country: "Country".to_string(),
            postal_code: None,
            region,
        }
    }

    #[tokio::test]
    async fn test_options_are_filtered_by_region() {
        let pool = memory_pool().await.unwrap();
        Venue::create(&pool, &venue("Berlin Hall", Region::Eu)).await.unwrap();
        Venue::create(&pool, &venue("Austin Center", Region::Us)).await.unwrap();
        Venue::create(&pool, &venue("Amsterdam Dome", Region::Eu)).await.unwrap();

        let eu: Vec<String> = Venue::options(&pool, Some(Region::Eu))
            .await
            .unwrap()
            .into_iter()
            .map(|(_, name)| name)
            .collect();
        assert_eq!(eu, vec!["Amsterdam Dome", "Berlin Hall"]);
        assert!(Venue::options(&pool, None).await.unwrap().is_empty());
        assert_eq!(Venue::find_all(&pool, None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_update() {
        let pool = memory_pool().await.unwrap();
        let created = Venue::create(&pool, &venue("Hall", Region::India)).await.unwrap();
        let updated = Venue::update(&pool, created.id, &venue("Grand Hall", Region::Online))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Grand Hall");
        assert_eq!(updated.region, Region::Online);
        assert!(Venue::update(&pool, 404, &venue("x", Region::Us)).await.unwrap().is_none());
    }
}
