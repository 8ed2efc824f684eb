use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde_json::{json, Map, Value};
use sqlx::SqlitePool;

use super::pages::{FormPage, IndexPage};
use super::views::*;
use super::{query_values, render, return_to};
use crate::actions;
use crate::config::Config;
use crate::error::{AppError, HtmlError};
use crate::forms::{decode, resolve_options, FormValues, ValidationErrors};
use crate::models::{EnumChoice, Region, Venue};
use crate::notifications::NotificationKind;
use crate::resources::{Resource, VenueResource};
use crate::schema::{Choice, Color, Column, Operation};

const INDEX: &str = "/admin/venues";

fn venue_data(venue: &Venue) -> Map<String, Value> {
    let Value::Object(map) = json!({
        "name": venue.name,
        "city": venue.city,
        "country": venue.country,
        "postal_code": venue.postal_code,
        "region": venue.region.value(),
    }) else {
        return Map::new();
    };
    map
}

fn cells(record: &Venue, columns: &[&Column]) -> Vec<CellView> {
    columns
        .iter()
        .map(|column| {
            let mut cell = match column.name {
                "name" => CellView::text(&record.name),
                "city" => CellView::text(&record.city),
                "country" => CellView::text(&record.country),
                "postal_code" => CellView::text(record.postal_code.clone().unwrap_or_default()),
                "region" => CellView::badge(record.region.label(), Color::Gray),
                _ => CellView::text(""),
            };
            cell.align = column.align.as_str();
            cell
        })
        .collect()
}

/// Form page; a `return_to` path travels along as a hidden field so
/// saving goes back to the form that linked here.
async fn form_page(
    pool: &SqlitePool,
    config: &Config,
    operation: Operation,
    action: String,
    data: &Map<String, Value>,
    errors: &ValidationErrors,
    back: Option<String>,
) -> Result<FormPage, AppError> {
    let schema = VenueResource::form();
    let options = resolve_options(pool, &schema, data).await?;
    let mut form = FormView::build(
        &schema,
        &FormContext {
            page_url: action.clone(),
            action,
            cancel_href: back.clone().unwrap_or_else(|| String::from(INDEX)),
            operation,
            env: config.app_env,
            data,
            errors,
            options: &options,
        },
    );
    if let Some(path) = back {
        form = form.with_hidden("return_to", path);
    }
    let heading = match operation {
        Operation::Create => String::from("Create Venue"),
        _ => format!("Edit {}", data.get("name").and_then(Value::as_str).unwrap_or("Venue")),
    };
    Ok(FormPage {
        title: heading.clone(),
        nav: nav(VenueResource::SLUG),
        toast: None,
        heading,
        form,
    })
}

fn saved_redirect(kind: NotificationKind, back: Option<String>) -> Response {
    let target = back.unwrap_or_else(|| String::from(INDEX));
    Redirect::to(&kind.redirect_to(&target)).into_response()
}

pub async fn index(State(pool): State<SqlitePool>, RawQuery(raw): RawQuery) -> Result<Response, HtmlError> {
    let values = query_values(raw);
    let schema = VenueResource::table();
    let venues = Venue::find_all(&pool, None).await?;

    let toast = Toast::from_values(&values);
    let state = TableState::new(INDEX, values);
    let selection = state.column_selection();
    let visible = schema.visible_columns(selection.as_deref());

    let mut table = TableView::new(&schema, &state, &visible);
    for record in &venues {
        let actions = schema
            .row_actions
            .iter()
            .map(|action| (action.group, RowActionView::link(action, format!("{INDEX}/{}/edit", record.id))))
            .collect();
        table.push_row(record.id, cells(record, &visible), actions);
    }

    let page = IndexPage {
        title: String::from(VenueResource::PLURAL_LABEL),
        nav: nav(VenueResource::SLUG),
        toast,
        create_href: Some(format!("{INDEX}/create")),
        table,
        overlay: None,
    };
    render(StatusCode::OK, &page)
}

/// Venues of one region, feeding the live venue select of the conference form.
pub async fn options(State(pool): State<SqlitePool>, RawQuery(raw): RawQuery) -> Result<Json<Vec<Choice>>, AppError> {
    let region = query_values(raw).get("region").and_then(Region::from_value);
    let venues = Venue::options(&pool, region).await?;
    Ok(Json(Choice::from_pairs(venues)))
}

pub async fn create(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    RawQuery(raw): RawQuery,
) -> Result<Response, HtmlError> {
    let back = return_to(&query_values(raw));
    let page = form_page(
        &pool,
        &config,
        Operation::Create,
        format!("{INDEX}/create"),
        &Map::new(),
        &ValidationErrors::default(),
        back,
    )
    .await?;
    render(StatusCode::OK, &page)
}

pub async fn store(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    body: Bytes,
) -> Result<Response, HtmlError> {
    let values = FormValues::parse(&body);
    let back = return_to(&values);
    let data = decode(&VenueResource::form(), &values);
    match actions::venue::create(&pool, data.clone()).await {
        Ok(_) => Ok(saved_redirect(NotificationKind::Created, back)),
        Err(AppError::Validation(errors)) => {
            let page = form_page(&pool, &config, Operation::Create, format!("{INDEX}/create"), &data, &errors, back).await?;
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
    let venue = Venue::find_by_id(&pool, id)
        .await?
        .ok_or(AppError::NotFound("Venue"))?;
    let back = return_to(&query_values(raw));
    let page = form_page(
        &pool,
        &config,
        Operation::Edit,
        format!("{INDEX}/{id}/edit"),
        &venue_data(&venue),
        &ValidationErrors::default(),
        back,
    )
    .await?;
    render(StatusCode::OK, &page)
}

pub async fn update(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    Path(id): Path<i64>,
    body: Bytes,
) -> Result<Response, HtmlError> {
    let values = FormValues::parse(&body);
    let back = return_to(&values);
    let data = decode(&VenueResource::form(), &values);
    match actions::venue::update(&pool, id, data.clone()).await {
        Ok(_) => Ok(saved_redirect(NotificationKind::Saved, back)),
        Err(AppError::Validation(errors)) => {
            let page = form_page(&pool, &config, Operation::Edit, format!("{INDEX}/{id}/edit"), &data, &errors, back).await?;
            render(StatusCode::UNPROCESSABLE_ENTITY, &page)
        }
        Err(e) => Err(e.into()),
    }
}
