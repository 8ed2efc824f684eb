use serde_json::{Map, Value};
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::forms::validated;
use crate::models::{Venue, VenueInput};
use crate::resources::{Resource, VenueResource};

pub async fn create(pool: &SqlitePool, data: Map<String, Value>) -> Result<Venue, AppError> {
    let input: VenueInput = validated(pool, &VenueResource::form(), data).await?;
    let venue = Venue::create(pool, &input).await?;
    tracing::info!("Created venue {} ({})", venue.id, venue.name);
    Ok(venue)
}

pub async fn update(pool: &SqlitePool, id: i64, data: Map<String, Value>) -> Result<Venue, AppError> {
    Venue::find_by_id(pool, id)
        .await?
        .ok_or(AppError::NotFound("Venue"))?;
    let input: VenueInput = validated(pool, &VenueResource::form(), data).await?;
    let venue = Venue::update(pool, id, &input)
        .await?
        .ok_or(AppError::NotFound("Venue"))?;
    tracing::info!("Updated venue {}", id);
    Ok(venue)
}
