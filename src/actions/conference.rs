use rand::Rng;
use serde_json::{Map, Value};
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::factory;
use crate::forms::validated;
use crate::models::{Conference, ConferenceInput, Speaker, Venue};
use crate::notifications::NotificationKind;
use crate::resources::{ConferenceResource, Resource};

pub async fn create(pool: &SqlitePool, data: Map<String, Value>) -> Result<Conference, AppError> {
    let input: ConferenceInput = validated(pool, &ConferenceResource::form(), data).await?;
    let mut tx = pool.begin().await?;
    let conference = Conference::create(&mut tx, &input).await?;
    tx.commit().await?;
    tracing::info!("Created conference {} ({})", conference.id, conference.name);
    Ok(conference)
}

pub async fn update(pool: &SqlitePool, id: i64, data: Map<String, Value>) -> Result<Conference, AppError> {
    if !Conference::exists(pool, id).await? {
        return Err(AppError::NotFound("Conference"));
    }
    let input: ConferenceInput = validated(pool, &ConferenceResource::form(), data).await?;
    let mut tx = pool.begin().await?;
    let conference = Conference::update(&mut tx, id, &input)
        .await?
        .ok_or(AppError::NotFound("Conference"))?;
    tx.commit().await?;
    tracing::info!("Updated conference {}", id);
    Ok(conference)
}

pub async fn bulk_delete(pool: &SqlitePool, ids: &[i64]) -> Result<(u64, NotificationKind), AppError> {
    let ids = super::talk::selection(ids)?;
    let mut tx = pool.begin().await?;
    let deleted = Conference::delete_many(&mut tx, &ids).await?;
    tx.commit().await?;
    tracing::info!("Deleted {} conferences", deleted);
    Ok((deleted, NotificationKind::Deleted))
}

/// Form values of a factory-made conference, for the "Fill with Factory
/// Data" action. Picks an existing venue of the generated region and a few
/// existing speakers when there are any.
pub async fn factory_values<R: Rng + Send>(pool: &SqlitePool, rng: &mut R) -> Result<Map<String, Value>, AppError> {
    let mut input = factory::conference(rng);

    let venues = Venue::options(pool, Some(input.region)).await?;
    if !venues.is_empty() {
        input.venue_id = Some(venues[rng.gen_range(0..venues.len())].0);
    }
    let speakers = Speaker::options(pool).await?;
    input.speakers = speakers
        .iter()
        .filter(|_| rng.gen_bool(0.5))
        .map(|(id, _)| *id)
        .collect();
    if input.speakers.is_empty() {
        input.speakers.extend(speakers.first().map(|(id, _)| *id));
    }

    match serde_json::to_value(&input)? {
        Value::Object(mut map) => {
            map.remove("talks");
            Ok(map)
        }
        _ => Ok(Map::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;
    use crate::models::{Region, SpeakerInput, VenueInput};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    async fn speaker(pool: &SqlitePool) -> i64 {
        Speaker::create(
            pool,
            &SpeakerInput {
                name: "Taylor".into(),
                email: "taylor@example.com".into(),
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
    async fn test_create_from_form_values() {
        let pool = memory_pool().await.unwrap();
        let speaker_id = speaker(&pool).await;
        let venue = Venue::create(
            &pool,
            &VenueInput {
                name: "Hall".into(),
                city: "Berlin".into(),
                country: "Germany".into(),
                postal_code: None,
                region: Region::Eu,
            },
        )
        .await
        .unwrap();

        let conference = create(
            &pool,
            object(json!({
                "name": "EuroRust",
                "description": "<p>Rust in Europe</p>",
                "start_date": "2025-10-09T09:00",
                "end_date": "2025-10-10T18:00",
                "status": "published",
                "region": "EU",
                "venue_id": venue.id.to_string(),
                "speakers": [speaker_id],
            })),
        )
        .await
        .unwrap();

        assert_eq!(conference.venue_id, Some(venue.id));
        assert!(conference.is_published);
        assert_eq!(Conference::speaker_ids(&pool, conference.id).await.unwrap(), vec![speaker_id]);
    }

    #[tokio::test]
    async fn test_venue_must_match_region() {
        let pool = memory_pool().await.unwrap();
        let speaker_id = speaker(&pool).await;
        let venue = Venue::create(
            &pool,
            &VenueInput {
                name: "Hall".into(),
                city: "Austin".into(),
                country: "United States".into(),
                postal_code: None,
                region: Region::Us,
            },
        )
        .await
        .unwrap();

        let err = create(
            &pool,
            object(json!({
                "name": "EuroRust",
                "description": "<p>x</p>",
                "start_date": "2025-10-09T09:00",
                "end_date": "2025-10-10T18:00",
                "status": "draft",
                "region": "EU",
                "venue_id": venue.id,
                "speakers": [speaker_id],
            })),
        )
        .await
        .unwrap_err();
        let AppError::Validation(errors) = err else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.first("venue_id"), Some("The selected venue is invalid."));
    }

    #[tokio::test]
    async fn test_factory_values_validate() {
        let pool = memory_pool().await.unwrap();
        speaker(&pool).await;
        let mut rng = StdRng::seed_from_u64(11);
        let values = factory_values(&pool, &mut rng).await.unwrap();
        let conference = create(&pool, values).await.unwrap();
        assert!(!Conference::speaker_ids(&pool, conference.id).await.unwrap().is_empty());
    }
}
