//! Server-rendered admin panel under `/admin` and the public sign-up page.

pub mod conferences;
pub mod dashboard;
pub mod pages;
pub mod signup;
pub mod speakers;
pub mod talks;
pub mod venues;
pub mod views;

use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;

use crate::error::HtmlError;
use crate::forms::FormValues;
use crate::AppState;

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::dashboard))
        // Talks
        .route("/talks", get(talks::index))
        .route("/talks/create", get(talks::create).post(talks::store))
        .route("/talks/export", get(talks::export))
        .route("/talks/bulk", post(talks::bulk))
        .route("/talks/{id}/edit", get(talks::edit).post(talks::update))
        .route("/talks/{id}/approve", post(talks::approve))
        .route("/talks/{id}/reject", get(talks::confirm_reject).post(talks::reject))
        // Speakers (view only, no edit page)
        .route("/speakers", get(speakers::index))
        .route("/speakers/create", get(speakers::create).post(speakers::store))
        .route("/speakers/bulk", post(speakers::bulk))
        .route("/speakers/{id}", get(speakers::show))
        // Conferences
        .route("/conferences", get(conferences::index))
        .route("/conferences/create", get(conferences::create).post(conferences::store))
        .route("/conferences/bulk", post(conferences::bulk))
        .route("/conferences/{id}/edit", get(conferences::edit).post(conferences::update))
        // Venues
        .route("/venues", get(venues::index))
        .route("/venues/options", get(venues::options))
        .route("/venues/create", get(venues::create).post(venues::store))
        .route("/venues/{id}/edit", get(venues::edit).post(venues::update))
}

pub(crate) fn render<T: Template>(status: StatusCode, template: &T) -> Result<Response, HtmlError> {
    let html = template.render()?;
    Ok((status, Html(html)).into_response())
}

pub(crate) fn query_values(raw: Option<String>) -> FormValues {
    FormValues::parse(raw.unwrap_or_default().as_bytes())
}

/// Local admin path to go back to after a related record was saved.
/// Anything that could leave the panel is ignored.
pub(crate) fn return_to(values: &FormValues) -> Option<String> {
    values
        .get("return_to")
        .filter(|path| path.starts_with("/admin"))
        .filter(|path| !path.contains("//") && !path.contains('\\'))
        .map(str::to_string)
}

/// Ids selected with the row checkboxes.
pub(crate) fn selected_ids(values: &FormValues) -> Vec<i64> {
    values
        .get_all("ids")
        .into_iter()
        .filter_map(|id| id.trim().parse().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_return_to_stays_in_admin() {
        let ok = FormValues::parse(b"return_to=%2Fadmin%2Fconferences%2Fcreate");
        assert_eq!(return_to(&ok).as_deref(), Some("/admin/conferences/create"));

        for bad in [
            &b"return_to=https%3A%2F%2Fevil.example"[..],
            b"return_to=%2F%2Fevil.example",
            b"return_to=%2Fadmin%2F%2Fevil.example",
            b"",
        ] {
            assert_eq!(return_to(&FormValues::parse(bad)), None);
        }
    }

    #[test]
    fn test_selected_ids() {
        let values = FormValues::parse(b"ids%5B%5D=3&ids%5B%5D=x&ids%5B%5D=7&action=approve");
        assert_eq!(selected_ids(&values), vec![3, 7]);
    }
}
