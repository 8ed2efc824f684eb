use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use serde_json::{json, Map, Value};
use sqlx::SqlitePool;

use super::pages::{ConfirmPage, FormPage, IndexPage, Overlay};
use super::views::*;
use super::{query_values, render, selected_ids};
use crate::actions;
use crate::config::Config;
use crate::error::{AppError, HtmlError};
use crate::forms::{decode, is_truthy, resolve_options, FormValues, ValidationErrors};
use crate::handlers::api::check_bulk_action;
use crate::handlers::api::talks::csv_attachment;
use crate::models::{EnumChoice, Speaker, Talk, TalkStatus, TalkWithSpeaker};
use crate::notifications::NotificationKind;
use crate::resources::{speaker, talk, Resource, TalkResource};
use crate::schema::{Column, FilterKind, Operation};

const INDEX: &str = "/admin/talks";

fn talk_data(talk: &Talk) -> Map<String, Value> {
    let Value::Object(map) = json!({
        "title": talk.title,
        "abstract": talk.abstract_text,
        "speaker_id": talk.speaker_id,
        "length": talk.length.value(),
        "new_talk": talk.new_talk,
    }) else {
        return Map::new();
    };
    map
}

fn cells(row: &TalkWithSpeaker, columns: &[&Column]) -> Vec<CellView> {
    let record = &row.talk;
    columns
        .iter()
        .map(|column| {
            let mut cell = match column.name {
                "title" => CellView::described(&record.title, talk::description(row)),
                "speaker.avatar" => CellView::image(
                    speaker::avatar_url(row.speaker_avatar.as_deref(), &row.speaker_name),
                    &row.speaker_name,
                    true,
                ),
                "speaker.name" => CellView::text(&row.speaker_name),
                "new_talk" => CellView::boolean(record.new_talk),
                "status" => CellView::badge(record.status.label(), record.status.color()),
                "length" => CellView::icon(record.length.icon(), record.length.label()),
                "created_at" => CellView::timestamp(column, &record.created_at),
                "updated_at" => CellView::timestamp(column, &record.updated_at),
                _ => CellView::text(""),
            };
            cell.align = column.align.as_str();
            cell
        })
        .collect()
}

async fn form_view(
    pool: &SqlitePool,
    config: &Config,
    operation: Operation,
    action: String,
    data: &Map<String, Value>,
    errors: &ValidationErrors,
) -> Result<FormView, AppError> {
    let schema = TalkResource::form();
    let options = resolve_options(pool, &schema, data).await?;
    Ok(FormView::build(
        &schema,
        &FormContext {
            page_url: action.clone(),
            action,
            cancel_href: String::from(INDEX),
            operation,
            env: config.app_env,
            data,
            errors,
            options: &options,
        },
    ))
}

async fn index_page(
    pool: &SqlitePool,
    values: FormValues,
    overlay: Option<Overlay>,
) -> Result<IndexPage, AppError> {
    let schema = TalkResource::table();
    let query = talk::list_query(&values);
    let rows = Talk::search(pool, &query).await?;
    let total = Talk::count_matching(pool, &query).await?;
    let speakers = Speaker::options(pool).await?;

    let toast = Toast::from_values(&values);
    let export = TableState::new(format!("{INDEX}/export"), values.clone())
        .href(&[("page", String::new()), ("per_page", String::new())]);
    let state = TableState::new(INDEX, values);
    let selection = state.column_selection();
    let visible = schema.visible_columns(selection.as_deref());

    let mut table = TableView::new(&schema, &state, &visible);
    table.filters = schema
        .filters
        .iter()
        .map(|filter| match &filter.kind {
            FilterKind::Ternary => FilterView {
                name: filter.name.to_string(),
                label: filter.label(),
                kind: "ternary",
                value: state.values.get(filter.name).unwrap_or_default().to_string(),
                checked: false,
                searchable: false,
                options: Vec::new(),
            },
            FilterKind::MultiSelect { searchable, .. } => FilterView {
                name: String::from("speakers[]"),
                label: filter.label(),
                kind: "multi_select",
                value: String::new(),
                checked: false,
                searchable: *searchable,
                options: speakers
                    .iter()
                    .map(|(id, name)| OptionView {
                        value: id.to_string(),
                        label: name.clone(),
                        description: None,
                        selected: query.speakers.contains(id),
                    })
                    .collect(),
            },
            FilterKind::Toggle => FilterView {
                name: filter.name.to_string(),
                label: filter.label(),
                kind: "toggle",
                value: String::from("1"),
                checked: query.has_avatar,
                searchable: false,
                options: Vec::new(),
            },
        })
        .collect();
    table.header_actions = schema
        .header_actions
        .iter()
        .map(|_| LinkView {
            label: talk::export_label(total),
            href: export.clone(),
            icon: Some("heroicon-o-arrow-down-tray"),
        })
        .collect();

    for row in &rows {
        let id = row.talk.id;
        let actions = schema
            .row_actions
            .iter()
            .map(|action| {
                let view = match action.name {
                    "edit" => RowActionView::link(action, state.href(&[("edit", id.to_string())])),
                    "approve" => RowActionView::post(action, format!("{INDEX}/{id}/approve"))
                        .disabled(row.talk.status == TalkStatus::Approved),
                    "reject" => RowActionView::link(action, format!("{INDEX}/{id}/reject"))
                        .disabled(row.talk.status == TalkStatus::Rejected),
                    _ => RowActionView::link(action, state.href(&[])),
                };
                (action.group, view)
            })
            .collect();
        table.push_row(id, cells(row, &visible), actions);
    }
    table.paginate(&state, &schema, total, query.page, query.per_page);

    Ok(IndexPage {
        title: String::from(TalkResource::PLURAL_LABEL),
        nav: nav(TalkResource::SLUG),
        toast,
        create_href: Some(format!("{INDEX}/create")),
        table,
        overlay,
    })
}

async fn edit_overlay(
    pool: &SqlitePool,
    config: &Config,
    talk: &Talk,
    data: &Map<String, Value>,
    errors: &ValidationErrors,
) -> Result<Overlay, AppError> {
    let form = form_view(
        pool,
        config,
        Operation::Edit,
        format!("{INDEX}/{}/edit", talk.id),
        data,
        errors,
    )
    .await?;
    Ok(Overlay {
        heading: format!("Edit {}", talk.title),
        close_href: String::from(INDEX),
        form,
    })
}

pub async fn index(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    RawQuery(raw): RawQuery,
) -> Result<Response, HtmlError> {
    let values = query_values(raw);
    let overlay = match values.get("edit").and_then(|id| id.parse::<i64>().ok()) {
        Some(id) => {
            let talk = Talk::find_by_id(&pool, id)
                .await?
                .ok_or(AppError::NotFound("Talk"))?;
            let data = talk_data(&talk);
            Some(edit_overlay(&pool, &config, &talk, &data, &ValidationErrors::default()).await?)
        }
        None => None,
    };
    let page = index_page(&pool, values, overlay).await?;
    render(StatusCode::OK, &page)
}

pub async fn create(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
) -> Result<Response, HtmlError> {
    let form = form_view(
        &pool,
        &config,
        Operation::Create,
        format!("{INDEX}/create"),
        &Map::new(),
        &ValidationErrors::default(),
    )
    .await?;
    let page = FormPage {
        title: String::from("Create Talk"),
        nav: nav(TalkResource::SLUG),
        toast: None,
        heading: String::from("Create Talk"),
        form,
    };
    render(StatusCode::OK, &page)
}

pub async fn store(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    body: Bytes,
) -> Result<Response, HtmlError> {
    let data = decode(&TalkResource::form(), &FormValues::parse(&body));
    match actions::talk::create(&pool, data.clone()).await {
        Ok(_) => Ok(Redirect::to(&NotificationKind::Created.redirect_to(INDEX)).into_response()),
        Err(AppError::Validation(errors)) => {
            let form = form_view(&pool, &config, Operation::Create, format!("{INDEX}/create"), &data, &errors).await?;
            let page = FormPage {
                title: String::from("Create Talk"),
                nav: nav(TalkResource::SLUG),
                toast: None,
                heading: String::from("Create Talk"),
                form,
            };
            render(StatusCode::UNPROCESSABLE_ENTITY, &page)
        }
        Err(e) => Err(e.into()),
    }
}

/// Talks are edited in a panel over the table.
pub async fn edit(Path(id): Path<i64>) -> Redirect {
    Redirect::to(&format!("{INDEX}?edit={id}"))
}

pub async fn update(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    Path(id): Path<i64>,
    body: Bytes,
) -> Result<Response, HtmlError> {
    let data = decode(&TalkResource::form(), &FormValues::parse(&body));
    match actions::talk::update(&pool, id, data.clone()).await {
        Ok(_) => Ok(Redirect::to(&NotificationKind::Saved.redirect_to(INDEX)).into_response()),
        Err(AppError::Validation(errors)) => {
            let talk = Talk::find_by_id(&pool, id)
                .await?
                .ok_or(AppError::NotFound("Talk"))?;
            let overlay = edit_overlay(&pool, &config, &talk, &data, &errors).await?;
            let page = index_page(&pool, FormValues::default(), Some(overlay)).await?;
            render(StatusCode::UNPROCESSABLE_ENTITY, &page)
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn approve(State(pool): State<SqlitePool>, Path(id): Path<i64>) -> Result<Redirect, HtmlError> {
    let (_, kind) = actions::talk::approve(&pool, id).await?;
    Ok(Redirect::to(&kind.redirect_to(INDEX)))
}

fn reject_dialog(talk: &Talk) -> ConfirmPage {
    ConfirmPage {
        title: String::from("Reject"),
        nav: nav(TalkResource::SLUG),
        toast: None,
        heading: format!("Reject {}", talk.title),
        message: String::from(ConfirmPage::MESSAGE),
        action: format!("{INDEX}/{}/reject", talk.id),
        hidden: vec![(String::from("confirmed"), String::from("1"))],
        confirm_label: "Reject",
        color: "danger",
        cancel_href: String::from(INDEX),
    }
}

pub async fn confirm_reject(State(pool): State<SqlitePool>, Path(id): Path<i64>) -> Result<Response, HtmlError> {
    let talk = Talk::find_by_id(&pool, id)
        .await?
        .ok_or(AppError::NotFound("Talk"))?;
    if talk.status == TalkStatus::Rejected {
        return Err(AppError::ActionDisabled("reject").into());
    }
    render(StatusCode::OK, &reject_dialog(&talk))
}

pub async fn reject(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    body: Bytes,
) -> Result<Response, HtmlError> {
    let confirmed = FormValues::parse(&body).get("confirmed").is_some_and(is_truthy);
    match actions::talk::reject(&pool, id, confirmed).await {
        Ok((_, kind)) => Ok(Redirect::to(&kind.redirect_to(INDEX)).into_response()),
        Err(AppError::ConfirmationRequired(_)) => {
            let talk = Talk::find_by_id(&pool, id)
                .await?
                .ok_or(AppError::NotFound("Talk"))?;
            render(StatusCode::CONFLICT, &reject_dialog(&talk))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn bulk(State(pool): State<SqlitePool>, body: Bytes) -> Result<Response, HtmlError> {
    let values = FormValues::parse(&body);
    let action = values.get("action").unwrap_or_default();
    let ids = selected_ids(&values);
    if ids.is_empty() {
        return Err(AppError::EmptySelection.into());
    }
    let confirmed = values.get("confirmed").is_some_and(is_truthy);

    let result = match check_bulk_action(&TalkResource::table(), action, confirmed) {
        Ok("approve") => actions::talk::bulk_approve(&pool, &ids).await,
        Ok("delete") => actions::talk::bulk_delete(&pool, &ids).await,
        Ok(other) => Err(AppError::BadRequest(format!("Unknown bulk action: {other}"))),
        Err(AppError::ConfirmationRequired(name)) => {
            let page = bulk_dialog(INDEX, TalkResource::SLUG, name, &ids);
            return render(StatusCode::OK, &page);
        }
        Err(e) => Err(e),
    };
    let (_, kind) = result?;
    Ok(Redirect::to(&kind.redirect_to(INDEX)).into_response())
}

/// Confirmation of a bulk action, re-posting the selection with `confirmed`.
pub(crate) fn bulk_dialog(index: &str, slug: &str, action: &'static str, ids: &[i64]) -> ConfirmPage {
    let mut hidden = vec![
        (String::from("action"), action.to_string()),
        (String::from("confirmed"), String::from("1")),
    ];
    hidden.extend(ids.iter().map(|id| (String::from("ids[]"), id.to_string())));
    ConfirmPage {
        title: String::from("Confirm"),
        nav: nav(slug),
        toast: None,
        heading: format!("{} {} selected record{}", capitalize(action), ids.len(), if ids.len() == 1 { "" } else { "s" }),
        message: String::from(ConfirmPage::MESSAGE),
        action: format!("{index}/bulk"),
        hidden,
        confirm_label: "Confirm",
        color: "danger",
        cancel_href: index.to_string(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub async fn export(State(pool): State<SqlitePool>, RawQuery(raw): RawQuery) -> Result<Response, HtmlError> {
    let query = talk::list_query(&query_values(raw));
    let csv = actions::talk::export(&pool, &query).await?;
    Ok(csv_attachment(csv).into_response())
}
