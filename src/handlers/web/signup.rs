//! Public attendee sign-up page.

use std::sync::Arc;

use askama::Template;
use axum::body::Bytes;
use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use serde_json::{Map, Value};
use sqlx::SqlitePool;

use super::views::{FormContext, FormView, NavItem, Toast};
use super::{query_values, render};
use crate::actions;
use crate::config::Config;
use crate::error::{AppError, HtmlError};
use crate::forms::{decode, FormValues, ResolvedOptions, ValidationErrors};
use crate::resources::attendee::total_price;
use crate::resources::SignUpForm;
use crate::schema::Operation;

const PATH: &str = "/signup";

#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignUpPage {
    pub title: String,
    pub nav: Vec<NavItem>,
    pub toast: Option<Toast>,
    pub form: FormView,
    /// Ticket price per attendee, for the live total.
    pub price: i64,
}

fn page(config: &Config, mut data: Map<String, Value>, errors: &ValidationErrors, toast: Option<Toast>) -> SignUpPage {
    let rows = data
        .get("attendees")
        .and_then(Value::as_array)
        .map_or(1, |rows| rows.len().max(1));
    data.insert(
        String::from("total_price"),
        Value::String(total_price(rows, config.signup_ticket_price)),
    );

    let form = FormView::build(
        &SignUpForm::form(),
        &FormContext {
            action: String::from(PATH),
            cancel_href: String::from(PATH),
            operation: Operation::Create,
            env: config.app_env,
            data: &data,
            errors,
            options: &ResolvedOptions::default(),
            page_url: String::from(PATH),
        },
    )
    .with_submit_label("Sign up");

    SignUpPage {
        title: String::from("Conference Sign-up"),
        nav: Vec::new(),
        toast,
        form,
        price: config.signup_ticket_price,
    }
}

pub async fn show(State(config): State<Arc<Config>>, RawQuery(raw): RawQuery) -> Result<Response, HtmlError> {
    let toast = Toast::from_values(&query_values(raw));
    render(StatusCode::OK, &page(&config, Map::new(), &ValidationErrors::default(), toast))
}

pub async fn submit(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    body: Bytes,
) -> Result<Response, HtmlError> {
    let data = decode(&SignUpForm::form(), &FormValues::parse(&body));
    match actions::signup::sign_up(&pool, &config, data.clone()).await {
        Ok(outcome) => Ok(Redirect::to(&outcome.notification.redirect_to(PATH)).into_response()),
        Err(AppError::Validation(errors)) => render(
            StatusCode::UNPROCESSABLE_ENTITY,
            &page(&config, data, &errors, None),
        ),
        Err(e) => Err(e.into()),
    }
}
