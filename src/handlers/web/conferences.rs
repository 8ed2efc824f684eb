use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Map, Value};
use sqlx::SqlitePool;

use super::pages::{FormPage, IndexPage};
use super::talks::bulk_dialog;
use super::views::*;
use super::{query_values, render, selected_ids};
use crate::actions;
use crate::config::Config;
use crate::error::{AppError, HtmlError};
use crate::forms::{decode, is_truthy, resolve_options, FormValues, ValidationErrors};
use crate::handlers::api::check_bulk_action;
use crate::models::{Conference, ConferenceDetail, ConferenceListItem, EnumChoice};
use crate::notifications::NotificationKind;
use crate::resources::conference::{DATE_DISPLAY_FORMAT, FILL_ACTION};
use crate::resources::{ConferenceResource, Resource};
use crate::schema::{Color, Column, Operation};

const INDEX: &str = "/admin/conferences";

fn conference_data(detail: &ConferenceDetail) -> Map<String, Value> {
    let conference = &detail.conference;
    let Value::Object(map) = json!({
        "name": conference.name,
        "description": conference.description,
        "start_date": conference.start_date,
        "end_date": conference.end_date,
        "status": conference.status.value(),
        "region": conference.region.value(),
        "is_published": conference.is_published,
        "venue_id": conference.venue_id,
        "speakers": detail.speakers,
    }) else {
        return Map::new();
    };
    map
}

fn cells(item: &ConferenceListItem, columns: &[&Column]) -> Vec<CellView> {
    let record = &item.conference;
    columns
        .iter()
        .map(|column| {
            let mut cell = match column.name {
                "name" => CellView::text(&record.name),
                "start_date" => CellView::naive(&record.start_date, DATE_DISPLAY_FORMAT),
                "end_date" => CellView::naive(&record.end_date, DATE_DISPLAY_FORMAT),
                "status" => CellView::badge(record.status.label(), record.status.color()),
                "region" => CellView::badge(record.region.label(), Color::Gray),
                "venue.name" => CellView::text(item.venue_name.clone().unwrap_or_default()),
                "speaker_count" => CellView::text(item.speaker_count.to_string()),
                "created_at" => CellView::timestamp(column, &record.created_at),
                "updated_at" => CellView::timestamp(column, &record.updated_at),
                _ => CellView::text(""),
            };
            cell.align = column.align.as_str();
            cell
        })
        .collect()
}

async fn form_page(
    pool: &SqlitePool,
    config: &Config,
    operation: Operation,
    action: String,
    data: &Map<String, Value>,
    errors: &ValidationErrors,
) -> Result<FormPage, AppError> {
    let schema = ConferenceResource::form();
    let options = resolve_options(pool, &schema, data).await?;
    let form = FormView::build(
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
    );
    let heading = match operation {
        Operation::Create => String::from("Create Conference"),
        _ => format!("Edit {}", data.get("name").and_then(Value::as_str).unwrap_or("Conference")),
    };
    Ok(FormPage {
        title: heading.clone(),
        nav: nav(ConferenceResource::SLUG),
        toast: None,
        heading,
        form,
    })
}

pub async fn index(State(pool): State<SqlitePool>, RawQuery(raw): RawQuery) -> Result<Response, HtmlError> {
    let values = query_values(raw);
    let schema = ConferenceResource::table();
    let conferences = Conference::find_all(&pool).await?;

    let toast = Toast::from_values(&values);
    let state = TableState::new(INDEX, values);
    let selection = state.column_selection();
    let visible = schema.visible_columns(selection.as_deref());

    let mut table = TableView::new(&schema, &state, &visible);
    for item in &conferences {
        let id = item.conference.id;
        let actions = schema
            .row_actions
            .iter()
            .map(|action| (action.group, RowActionView::link(action, format!("{INDEX}/{id}/edit"))))
            .collect();
        table.push_row(id, cells(item, &visible), actions);
    }

    let page = IndexPage {
        title: String::from(ConferenceResource::PLURAL_LABEL),
        nav: nav(ConferenceResource::SLUG),
        toast,
        create_href: Some(format!("{INDEX}/create")),
        table,
        overlay: None,
    };
    render(StatusCode::OK, &page)
}

/// Create page. `?fill=fill_factory` pre-populates the form with
/// generated values outside production.
pub async fn create(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    RawQuery(raw): RawQuery,
) -> Result<Response, HtmlError> {
    let values = query_values(raw);
    let schema = ConferenceResource::form();
    let fill = values.get("fill") == Some(FILL_ACTION)
        && schema
            .visible_actions(Operation::Create, config.app_env)
            .iter()
            .any(|action| action.name == FILL_ACTION);

    let data = if fill {
        tracing::debug!("Filling conference form with factory data");
        actions::conference::factory_values(&pool, &mut StdRng::from_entropy()).await?
    } else {
        Map::new()
    };
    let mut page = form_page(
        &pool,
        &config,
        Operation::Create,
        format!("{INDEX}/create"),
        &data,
        &ValidationErrors::default(),
    )
    .await?;
    page.toast = Toast::from_values(&values);
    render(StatusCode::OK, &page)
}

pub async fn store(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    body: Bytes,
) -> Result<Response, HtmlError> {
    let data = decode(&ConferenceResource::form(), &FormValues::parse(&body));
    match actions::conference::create(&pool, data.clone()).await {
        Ok(conference) => {
            let target = format!("{INDEX}/{}/edit", conference.id);
            Ok(Redirect::to(&NotificationKind::Created.redirect_to(&target)).into_response())
        }
        Err(AppError::Validation(errors)) => {
            let page = form_page(&pool, &config, Operation::Create, format!("{INDEX}/create"), &data, &errors).await?;
            render(StatusCode::UNPROCESSABLE_ENTITY, &page)
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn edit(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    Path(id): Path<i64>,
    RawQuery(raw): RawQuery,
) -> Result<Response, HtmlError> {
    let detail = Conference::detail(&pool, id)
        .await?
        .ok_or(AppError::NotFound("Conference"))?;
    let mut page = form_page(
        &pool,
        &config,
        Operation::Edit,
        format!("{INDEX}/{id}/edit"),
        &conference_data(&detail),
        &ValidationErrors::default(),
    )
    .await?;
    page.toast = Toast::from_values(&query_values(raw));
    render(StatusCode::OK, &page)
}

pub async fn update(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    Path(id): Path<i64>,
    body: Bytes,
) -> Result<Response, HtmlError> {
    let data = decode(&ConferenceResource::form(), &FormValues::parse(&body));
    match actions::conference::update(&pool, id, data.clone()).await {
        Ok(_) => {
            let target = format!("{INDEX}/{id}/edit");
            Ok(Redirect::to(&NotificationKind::Saved.redirect_to(&target)).into_response())
        }
        Err(AppError::Validation(errors)) => {
            let page = form_page(&pool, &config, Operation::Edit, format!("{INDEX}/{id}/edit"), &data, &errors).await?;
            render(StatusCode::UNPROCESSABLE_ENTITY, &page)
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

    let result = match check_bulk_action(&ConferenceResource::table(), action, confirmed) {
        Ok("delete") => actions::conference::bulk_delete(&pool, &ids).await,
        Ok(other) => Err(AppError::BadRequest(format!("Unknown bulk action: {other}"))),
        Err(AppError::ConfirmationRequired(name)) => {
            return render(StatusCode::OK, &bulk_dialog(INDEX, ConferenceResource::SLUG, name, &ids));
        }
        Err(e) => Err(e),
    };
    let (_, kind) = result?;
    Ok(Redirect::to(&kind.redirect_to(INDEX)).into_response())
}
