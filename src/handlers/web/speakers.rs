use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Multipart, Path, RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use serde_json::{Map, Value};
use sqlx::SqlitePool;

use super::pages::{FormPage, IndexPage, ViewPage};
use super::talks::bulk_dialog;
use super::views::*;
use super::{query_values, render, return_to, selected_ids};
use crate::actions;
use crate::config::Config;
use crate::error::{AppError, HtmlError};
use crate::forms::{decode, is_truthy, resolve_options, FormValues, Upload, ValidationErrors};
use crate::handlers::api::check_bulk_action;
use crate::models::{has_spoken, EnumChoice, Speaker, Talk};
use crate::notifications::NotificationKind;
use crate::resources::{speaker, Resource, SpeakerResource};
use crate::schema::{Column, Entry, Infolist, Operation};

const INDEX: &str = "/admin/speakers";

fn cells(record: &Speaker, columns: &[&Column]) -> Vec<CellView> {
    columns
        .iter()
        .map(|column| {
            let mut cell = match column.name {
                "name" => CellView::text(&record.name),
                "email" => CellView::text(&record.email),
                "twitter_handle" => CellView::text(record.twitter_handle.clone().unwrap_or_default()),
                "created_at" => CellView::timestamp(column, &record.created_at),
                "updated_at" => CellView::timestamp(column, &record.updated_at),
                _ => CellView::text(""),
            };
            cell.align = column.align.as_str();
            cell
        })
        .collect()
}

pub async fn index(State(pool): State<SqlitePool>, RawQuery(raw): RawQuery) -> Result<Response, HtmlError> {
    let values = query_values(raw);
    let schema = SpeakerResource::table();
    let speakers = Speaker::search(&pool, &speaker::list_query(&values)).await?;

    let toast = Toast::from_values(&values);
    let state = TableState::new(INDEX, values);
    let selection = state.column_selection();
    let visible = schema.visible_columns(selection.as_deref());

    let mut table = TableView::new(&schema, &state, &visible);
    for record in &speakers {
        let actions = schema
            .row_actions
            .iter()
            .map(|action| (action.group, RowActionView::link(action, format!("{INDEX}/{}", record.id))))
            .collect();
        table.push_row(record.id, cells(record, &visible), actions);
    }

    let page = IndexPage {
        title: String::from(SpeakerResource::PLURAL_LABEL),
        nav: nav(SpeakerResource::SLUG),
        toast,
        create_href: Some(format!("{INDEX}/create")),
        table,
        overlay: None,
    };
    render(StatusCode::OK, &page)
}

async fn form_page(
    pool: &SqlitePool,
    config: &Config,
    data: &Map<String, Value>,
    errors: &ValidationErrors,
    back: Option<String>,
) -> Result<FormPage, AppError> {
    let schema = SpeakerResource::form();
    let options = resolve_options(pool, &schema, data).await?;
    let action = format!("{INDEX}/create");
    let mut form = FormView::build(
        &schema,
        &FormContext {
            page_url: action.clone(),
            action,
            cancel_href: back.clone().unwrap_or_else(|| String::from(INDEX)),
            operation: Operation::Create,
            env: config.app_env,
            data,
            errors,
            options: &options,
        },
    );
    if let Some(path) = back {
        form = form.with_hidden("return_to", path);
    }
    Ok(FormPage {
        title: String::from("Create Speaker"),
        nav: nav(SpeakerResource::SLUG),
        toast: None,
        heading: String::from("Create Speaker"),
        form,
    })
}

pub async fn create(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    RawQuery(raw): RawQuery,
) -> Result<Response, HtmlError> {
    let back = return_to(&query_values(raw));
    let page = form_page(&pool, &config, &Map::new(), &ValidationErrors::default(), back).await?;
    render(StatusCode::OK, &page)
}

/// Multipart submission: text fields plus the optional avatar file.
pub async fn store(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    mut multipart: Multipart,
) -> Result<Response, HtmlError> {
    let mut values = FormValues::default();
    let mut avatar = None;

    while let Some(field) = multipart.next_field().await.map_err(AppError::from)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "avatar" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(AppError::from)?;
            if !file_name.is_empty() && !bytes.is_empty() {
                avatar = Some(Upload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
        } else {
            let value = field.text().await.map_err(AppError::from)?;
            values.push(name, value);
        }
    }

    let back = return_to(&values);
    let data = decode(&SpeakerResource::form(), &values);
    match actions::speaker::create(&pool, &config.storage_dir, data.clone(), avatar).await {
        Ok(created) => {
            let target = back.clone().unwrap_or_else(|| format!("{INDEX}/{}", created.id));
            Ok(Redirect::to(&NotificationKind::Created.redirect_to(&target)).into_response())
        }
        Err(AppError::Validation(errors)) => {
            let page = form_page(&pool, &config, &data, &errors, back).await?;
            render(StatusCode::UNPROCESSABLE_ENTITY, &page)
        }
        Err(e) => Err(e.into()),
    }
}

fn entry_value(record: &Speaker, talks: &[Talk], entry: &Entry) -> EntryValue {
    match entry.name {
        "avatar" => EntryValue::Image(speaker::avatar_url(record.avatar.as_deref(), &record.name)),
        "name" => EntryValue::Text(record.name.clone()),
        "email" => EntryValue::Text(record.email.clone()),
        "twitter_handle" => match record.twitter_handle.as_deref().filter(|h| !h.is_empty()) {
            Some(handle) => {
                let (text, href) = speaker::twitter_link(handle);
                EntryValue::Link { text, href }
            }
            None => EntryValue::Empty,
        },
        "has_spoken" => {
            let (label, color) = speaker::has_spoken_badge(has_spoken(talks));
            EntryValue::Badge(label, color)
        }
        "bio" => match record.bio.as_deref().filter(|b| !b.trim().is_empty()) {
            Some(bio) => EntryValue::Html(bio.to_string()),
            None => EntryValue::Empty,
        },
        "qualifications" => EntryValue::List(
            record
                .qualifications
                .0
                .iter()
                .map(|q| q.label().to_string())
                .collect(),
        ),
        _ => EntryValue::Empty,
    }
}

pub async fn show(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    RawQuery(raw): RawQuery,
) -> Result<Response, HtmlError> {
    let record = Speaker::find_by_id(&pool, id)
        .await?
        .ok_or(AppError::NotFound("Speaker"))?;
    let talks = Talk::for_speaker(&pool, id).await?;
    let infolist = SpeakerResource::infolist().unwrap_or(Infolist { sections: Vec::new() });

    let page = ViewPage {
        title: record.name.clone(),
        nav: nav(SpeakerResource::SLUG),
        toast: Toast::from_values(&query_values(raw)),
        heading: record.name.clone(),
        back_href: String::from(INDEX),
        sections: InfoSectionView::build(&infolist, |entry| entry_value(&record, &talks, entry)),
        related_heading: "Talks",
        related: talks
            .iter()
            .map(|t| LinkView {
                label: format!("{} ({})", t.title, t.status.label()),
                href: format!("/admin/talks?edit={}", t.id),
                icon: None,
            })
            .collect(),
    };
    render(StatusCode::OK, &page)
}

pub async fn bulk(State(pool): State<SqlitePool>, body: Bytes) -> Result<Response, HtmlError> {
    let values = FormValues::parse(&body);
    let action = values.get("action").unwrap_or_default();
    let ids = selected_ids(&values);
    if ids.is_empty() {
        return Err(AppError::EmptySelection.into());
    }
    let confirmed = values.get("confirmed").is_some_and(is_truthy);

    let result = match check_bulk_action(&SpeakerResource::table(), action, confirmed) {
        Ok("delete") => actions::speaker::bulk_delete(&pool, &ids).await,
        Ok(other) => Err(AppError::BadRequest(format!("Unknown bulk action: {other}"))),
        Err(AppError::ConfirmationRequired(name)) => {
            return render(StatusCode::OK, &bulk_dialog(INDEX, SpeakerResource::SLUG, name, &ids));
        }
        Err(e) => Err(e),
    };
    let (_, kind) = result?;
    Ok(Redirect::to(&kind.redirect_to(INDEX)).into_response())
}
