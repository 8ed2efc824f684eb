use std::path::Path;

use serde_json::{Map, Value};
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::forms::{resolve_options, store_upload, validate, validate_upload, Upload};
use crate::models::{Speaker, SpeakerInput};
use crate::notifications::NotificationKind;
use crate::resources::{Resource, SpeakerResource};
use crate::schema::FieldKind;

/// Create a speaker from form values and an optional avatar upload. The
/// avatar is only written to storage once every field has passed.
pub async fn create(
    pool: &SqlitePool,
    storage_dir: &Path,
    mut data: Map<String, Value>,
    avatar: Option<Upload>,
) -> Result<Speaker, AppError> {
    let schema = SpeakerResource::form();
    let options = resolve_options(pool, &schema, &data).await?;
    let mut errors = validate(&schema, &mut data, &options).err().unwrap_or_default();

    let avatar_field = schema.field("avatar");
    if let (Some(upload), Some(field)) = (&avatar, avatar_field) {
        if let Err(message) = validate_upload(field, upload) {
            errors.add(field.name, message);
        }
    }
    errors.into_result()?;

    let input: SpeakerInput = serde_json::from_value(Value::Object(data))?;
    let directory = match avatar_field.map(|f| &f.kind) {
        Some(FieldKind::FileUpload { directory, .. }) => *directory,
        _ => "avatars",
    };
    let avatar_path = match &avatar {
        Some(upload) => Some(store_upload(storage_dir, directory, upload).await?),
        None => None,
    };

    let speaker = match Speaker::create(pool, &input, avatar_path.clone()).await {
        Ok(speaker) => speaker,
        Err(e) => {
            if let Some(path) = &avatar_path {
                discard_upload(storage_dir, path).await;
            }
            return Err(e.into());
        }
    };
    tracing::info!("Created speaker {} ({})", speaker.id, speaker.name);
    Ok(speaker)
}

/// Remove a stored avatar whose speaker row was never written.
async fn discard_upload(storage_dir: &Path, path: &str) {
    if let Err(e) = tokio::fs::remove_file(storage_dir.join(path)).await {
        tracing::warn!("Failed to remove orphaned upload {}: {}", path, e);
    }
}

/// Delete the selected speakers; their talks go with them.
pub async fn bulk_delete(pool: &SqlitePool, ids: &[i64]) -> Result<(u64, NotificationKind), AppError> {
    let ids = super::talk::selection(ids)?;
    let mut tx = pool.begin().await?;
    let deleted = Speaker::delete_many(&mut *tx, &ids).await?;
    tx.commit().await?;
    tracing::info!("Deleted {} speakers", deleted);
    Ok((deleted, NotificationKind::Deleted))
}
