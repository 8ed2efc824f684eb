use askama::Template;
use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::Response;
use sqlx::SqlitePool;

use super::views::{nav, NavItem, Toast};
use super::{query_values, render};
use crate::error::HtmlError;
use crate::models::{Conference, EnumChoice};
use crate::resources::conference::DATE_DISPLAY_FORMAT;

const RECENT_CONFERENCES: usize = 5;

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage {
    pub title: String,
    pub nav: Vec<NavItem>,
    pub toast: Option<Toast>,
    pub stats: Vec<Stat>,
    pub recent_conferences: Vec<RecentConference>,
}

pub struct Stat {
    pub label: &'static str,
    pub value: i64,
    pub href: &'static str,
}

pub struct RecentConference {
    pub href: String,
    pub name: String,
    pub venue: String,
    pub start_date: String,
    pub status: &'static str,
}

#[derive(sqlx::FromRow)]
struct Totals {
    conferences: i64,
    talks: i64,
    submitted_talks: i64,
    speakers: i64,
    venues: i64,
    attendees: i64,
}

pub async fn dashboard(State(pool): State<SqlitePool>, RawQuery(raw): RawQuery) -> Result<Response, HtmlError> {
    let totals = sqlx::query_as::<_, Totals>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM conferences) AS conferences,
            (SELECT COUNT(*) FROM talks) AS talks,
            (SELECT COUNT(*) FROM talks WHERE status = 'submitted') AS submitted_talks,
            (SELECT COUNT(*) FROM speakers) AS speakers,
            (SELECT COUNT(*) FROM venues) AS venues,
            (SELECT COUNT(*) FROM attendees) AS attendees
        "#,
    )
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Database error fetching dashboard totals: {}", e);
        e
    })?;

    let recent_conferences = Conference::find_all(&pool)
        .await?
        .into_iter()
        .take(RECENT_CONFERENCES)
        .map(|item| RecentConference {
            href: format!("/admin/conferences/{}/edit", item.conference.id),
            venue: item.venue_name.unwrap_or_else(|| String::from("-")),
            start_date: item.conference.start_date.format(DATE_DISPLAY_FORMAT).to_string(),
            status: item.conference.status.label(),
            name: item.conference.name,
        })
        .collect();

    let page = DashboardPage {
        title: String::from("Dashboard"),
        nav: nav("dashboard"),
        toast: Toast::from_values(&query_values(raw)),
        stats: vec![
            Stat { label: "Conferences", value: totals.conferences, href: "/admin/conferences" },
            Stat { label: "Talks", value: totals.talks, href: "/admin/talks" },
            Stat { label: "Awaiting review", value: totals.submitted_talks, href: "/admin/talks" },
            Stat { label: "Speakers", value: totals.speakers, href: "/admin/speakers" },
            Stat { label: "Venues", value: totals.venues, href: "/admin/venues" },
            Stat { label: "Attendees", value: totals.attendees, href: "/signup" },
        ],
        recent_conferences,
    };
    render(StatusCode::OK, &page)
}
