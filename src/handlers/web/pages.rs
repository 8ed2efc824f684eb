//! Page templates shared by every resource.

use askama::Template;

use super::views::{FormView, InfoSectionView, LinkView, NavItem, TableView, Toast};

/// Edit form shown in a slide-over panel on top of a table.
pub struct Overlay {
    pub heading: String,
    pub close_href: String,
    pub form: FormView,
}

#[derive(Template)]
#[template(path = "resource/index.html")]
pub struct IndexPage {
    pub title: String,
    pub nav: Vec<NavItem>,
    pub toast: Option<Toast>,
    pub create_href: Option<String>,
    pub table: TableView,
    pub overlay: Option<Overlay>,
}

#[derive(Template)]
#[template(path = "resource/form.html")]
pub struct FormPage {
    pub title: String,
    pub nav: Vec<NavItem>,
    pub toast: Option<Toast>,
    pub heading: String,
    pub form: FormView,
}

#[derive(Template)]
#[template(path = "resource/view.html")]
pub struct ViewPage {
    pub title: String,
    pub nav: Vec<NavItem>,
    pub toast: Option<Toast>,
    pub heading: String,
    pub back_href: String,
    pub sections: Vec<InfoSectionView>,
    pub related_heading: &'static str,
    pub related: Vec<LinkView>,
}

/// Confirmation dialog of an action that asks before running.
#[derive(Template)]
#[template(path = "resource/confirm.html")]
pub struct ConfirmPage {
    pub title: String,
    pub nav: Vec<NavItem>,
    pub toast: Option<Toast>,
    pub heading: String,
    pub message: String,
    pub action: String,
    pub hidden: Vec<(String, String)>,
    pub confirm_label: &'static str,
    pub color: &'static str,
    pub cancel_href: String,
}

impl ConfirmPage {
    pub const MESSAGE: &'static str = "Are you sure you would like to do this?";
}
