use serde_json::{Map, Value};
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::forms::validated;
use crate::models::{Talk, TalkInput, TalkListQuery, TalkStatus};
use crate::notifications::NotificationKind;
use crate::resources::{talk, Resource, TalkResource};

async fn find(pool: &SqlitePool, id: i64) -> Result<Talk, AppError> {
    Talk::find_by_id(pool, id).await?.ok_or(AppError::NotFound("Talk"))
}

pub async fn create(pool: &SqlitePool, data: Map<String, Value>) -> Result<Talk, AppError> {
    let input: TalkInput = validated(pool, &TalkResource::form(), data).await?;
    let talk = Talk::create(pool, &input).await?;
    tracing::info!("Created talk {} for speaker {}", talk.id, talk.speaker_id);
    Ok(talk)
}

pub async fn update(pool: &SqlitePool, id: i64, data: Map<String, Value>) -> Result<Talk, AppError> {
    find(pool, id).await?;
    let input: TalkInput = validated(pool, &TalkResource::form(), data).await?;
    let talk = Talk::update(pool, id, &input)
        .await?
        .ok_or(AppError::NotFound("Talk"))?;
    tracing::info!("Updated talk {}", id);
    Ok(talk)
}

/// Approve one talk. Disabled once the talk is approved.
pub async fn approve(pool: &SqlitePool, id: i64) -> Result<(Talk, NotificationKind), AppError> {
    let talk = find(pool, id).await?;
    if talk.status == TalkStatus::Approved {
        return Err(AppError::ActionDisabled("approve"));
    }
    Talk::approve(pool, id).await?;
    tracing::info!("Talk {} approved", id);
    Ok((find(pool, id).await?, NotificationKind::TalkApproved))
}

/// Reject one talk after explicit confirmation. Disabled once the talk is rejected.
pub async fn reject(pool: &SqlitePool, id: i64, confirmed: bool) -> Result<(Talk, NotificationKind), AppError> {
    let talk = find(pool, id).await?;
    if talk.status == TalkStatus::Rejected {
        return Err(AppError::ActionDisabled("reject"));
    }
    if !confirmed {
        return Err(AppError::ConfirmationRequired("reject"));
    }
    Talk::reject(pool, id).await?;
    tracing::info!("Talk {} rejected", id);
    Ok((find(pool, id).await?, NotificationKind::TalkRejected))
}

/// Approve every selected talk in one transaction. A missing id rolls the
/// whole batch back. One notification regardless of the batch size.
pub async fn bulk_approve(pool: &SqlitePool, ids: &[i64]) -> Result<(u64, NotificationKind), AppError> {
    let ids = selection(ids)?;
    let mut tx = pool.begin().await?;
    for id in &ids {
        if !Talk::approve(&mut *tx, *id).await? {
            tracing::info!("Bulk approve aborted: talk {} does not exist", id);
            return Err(AppError::NotFound("Talk"));
        }
    }
    tx.commit().await?;
    tracing::info!("Approved {} talks", ids.len());
    Ok((ids.len() as u64, NotificationKind::TalksApproved))
}

pub async fn bulk_delete(pool: &SqlitePool, ids: &[i64]) -> Result<(u64, NotificationKind), AppError> {
    let ids = selection(ids)?;
    let mut tx = pool.begin().await?;
    let deleted = Talk::delete_many(&mut *tx, &ids).await?;
    tx.commit().await?;
    tracing::info!("Deleted {} talks", deleted);
    Ok((deleted, NotificationKind::Deleted))
}

/// CSV of every talk matching the table filters, in table order.
pub async fn export(pool: &SqlitePool, query: &TalkListQuery) -> Result<Vec<u8>, AppError> {
    let rows = Talk::search_all(pool, query).await?;
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(talk::EXPORT_HEADER)?;
    for row in &rows {
        writer.write_record(talk::export_record(row))?;
    }
    tracing::info!("Exported {} talks", rows.len());
    writer.into_inner().map_err(|e| AppError::Io(e.into_error()))
}

/// Deduplicated, non-empty selection.
pub(crate) fn selection(ids: &[i64]) -> Result<Vec<i64>, AppError> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Err(AppError::EmptySelection);
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;
    use crate::models::{Speaker, SpeakerInput, TalkLength};

    async fn seed(pool: &SqlitePool, titles: &[&str]) -> Vec<i64> {
        let speaker = Speaker::create(
            pool,
            &SpeakerInput {
                name: "Ann".into(),
                email: "ann@example.com".into(),
                twitter_handle: None,
                bio: None,
                qualifications: Vec::new(),
            },
            None,
        )
        .await
        .unwrap();
        let mut ids = Vec::new();
        for title in titles {
            let talk = Talk::create(
                pool,
                &TalkInput {
                    title: title.to_string(),
                    abstract_text: "<p>About it</p>".into(),
                    speaker_id: speaker.id,
                    length: TalkLength::Normal,
                    new_talk: true,
                },
            )
            .await
            .unwrap();
            ids.push(talk.id);
        }
        ids
    }

    #[tokio::test]
    async fn test_approve_then_reapprove_is_disabled() {
        let pool = memory_pool().await.unwrap();
        let ids = seed(&pool, &["One"]).await;

        let (talk, kind) = approve(&pool, ids[0]).await.unwrap();
        assert_eq!(talk.status, TalkStatus::Approved);
        assert_eq!(kind, NotificationKind::TalkApproved);

        let err = approve(&pool, ids[0]).await.unwrap_err();
        assert!(matches!(err, AppError::ActionDisabled("approve")));
        assert_eq!(find(&pool, ids[0]).await.unwrap().status, TalkStatus::Approved);
    }

    #[tokio::test]
    async fn test_reject_requires_confirmation() {
        let pool = memory_pool().await.unwrap();
        let ids = seed(&pool, &["One"]).await;

        let err = reject(&pool, ids[0], false).await.unwrap_err();
        assert!(matches!(err, AppError::ConfirmationRequired("reject")));
        assert_eq!(find(&pool, ids[0]).await.unwrap().status, TalkStatus::Submitted);

        let (talk, kind) = reject(&pool, ids[0], true).await.unwrap();
        assert_eq!(talk.status, TalkStatus::Rejected);
        assert_eq!(kind, NotificationKind::TalkRejected);
        assert!(matches!(
            reject(&pool, ids[0], true).await.unwrap_err(),
            AppError::ActionDisabled("reject")
        ));
    }

    #[tokio::test]
    async fn test_bulk_approve_is_atomic() {
        let pool = memory_pool().await.unwrap();
        let ids = seed(&pool, &["One", "Two", "Three"]).await;

        let err = bulk_approve(&pool, &[ids[0], 9999]).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound("Talk")));
        assert_eq!(find(&pool, ids[0]).await.unwrap().status, TalkStatus::Submitted);

        let (count, kind) = bulk_approve(&pool, &ids).await.unwrap();
        assert_eq!(count, 3);
        assert_eq!(kind, NotificationKind::TalksApproved);
        for id in ids {
            assert_eq!(find(&pool, id).await.unwrap().status, TalkStatus::Approved);
        }
    }

    #[tokio::test]
    async fn test_empty_selection() {
        let pool = memory_pool().await.unwrap();
        assert!(matches!(bulk_approve(&pool, &[]).await.unwrap_err(), AppError::EmptySelection));
        assert!(matches!(bulk_delete(&pool, &[]).await.unwrap_err(), AppError::EmptySelection));
    }

    #[tokio::test]
    async fn test_export_has_header_and_rows() {
        let pool = memory_pool().await.unwrap();
        seed(&pool, &["Intro to Rust", "Async, in depth"]).await;
        let bytes = export(&pool, &TalkListQuery::default()).await.unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("id,title,speaker,status"));
        assert!(text.contains("\"Async, in depth\""));
    }

    #[tokio::test]
    async fn test_export_neutralizes_formulas() {
        let pool = memory_pool().await.unwrap();
        seed(&pool, &["=HYPERLINK(\"https://evil.example\",\"Click\")"]).await;
        let bytes = export(&pool, &TalkListQuery::default()).await.unwrap();

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[1], "'=HYPERLINK(\"https://evil.example\",\"Click\")");
    }
}
