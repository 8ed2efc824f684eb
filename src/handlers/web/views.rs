//! View models for the admin templates.
//!
//! Descriptors from [`crate::schema`] are flattened here into plain structs of
//! preformatted strings so the askama templates stay free of logic.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::config::AppEnv;
use crate::forms::{field_choices, parse_date_time, FormValues, ResolvedOptions, ValidationErrors};
use crate::notifications::{NotificationKind, Severity};
use crate::resources::navigation;
use crate::schema::*;

/// Toolbar of rich text editors, before per-field removals.
const RICH_TEXT_TOOLBAR: &[(&str, &str)] = &[
    ("bold", "strong"),
    ("italic", "em"),
    ("strike", "s"),
    ("h2", "h2"),
    ("h3", "h3"),
    ("bulletList", "ul"),
    ("orderedList", "ol"),
    ("blockquote", "blockquote"),
    ("codeBlock", "pre"),
];

pub struct NavItem {
    pub href: String,
    pub label: &'static str,
    pub active: bool,
}

/// Admin navigation with `active` highlighted.
pub fn nav(active: &str) -> Vec<NavItem> {
    navigation()
        .into_iter()
        .map(|(slug, label)| NavItem {
            href: format!("/admin/{slug}"),
            label,
            active: slug == active,
        })
        .collect()
}

/// Notification toast carried through a redirect.
pub struct Toast {
    pub severity: &'static str,
    pub title: &'static str,
    pub body: &'static str,
    pub duration_ms: u32,
}

impl Toast {
    pub fn from_values(values: &FormValues) -> Option<Self> {
        values
            .get("notification")
            .and_then(NotificationKind::from_key)
            .map(Self::from)
    }
}

impl From<NotificationKind> for Toast {
    fn from(kind: NotificationKind) -> Self {
        let notification = kind.notification();
        Self {
            severity: match notification.severity {
                Severity::Success => "success",
                Severity::Info => "info",
            },
            title: notification.title,
            body: notification.body,
            duration_ms: notification.duration_ms,
        }
    }
}

// ---------------------------------------------------------------------------
// Forms
// ---------------------------------------------------------------------------

pub struct FormView {
    pub action: String,
    pub multipart: bool,
    pub submit_label: &'static str,
    pub cancel_href: String,
    pub tabs: Vec<TabView>,
    pub actions: Vec<LinkView>,
    pub hidden: Vec<(String, String)>,
    pub has_errors: bool,
}

pub struct TabView {
    pub id: String,
    pub label: String,
    pub has_errors: bool,
    pub sections: Vec<SectionView>,
}

pub struct SectionView {
    pub heading: Option<&'static str>,
    pub description: Option<&'static str>,
    pub icon: Option<&'static str>,
    pub collapsible: bool,
    pub groups: Vec<GroupView>,
}

pub struct GroupView {
    pub legend: Option<&'static str>,
    pub columns: u8,
    pub fields: Vec<FieldView>,
}

#[derive(Default)]
pub struct FieldView {
    /// Input name as submitted.
    pub name: String,
    pub id: String,
    pub label: String,
    pub widget: &'static str,
    pub value: String,
    /// Value in the field's display format, for date-times.
    pub display_value: String,
    pub display_format: &'static str,
    pub checked: bool,
    pub required: bool,
    pub maxlength: Option<usize>,
    pub helper_text: Option<&'static str>,
    pub placeholder: Option<&'static str>,
    pub full_width: bool,
    pub errors: Vec<String>,
    pub options: Vec<OptionView>,
    pub multiple: bool,
    pub searchable: bool,
    pub live: bool,
    pub depends_on: Option<&'static str>,
    pub columns: u8,
    pub bulk_toggleable: bool,
    pub toolbar: Vec<(&'static str, &'static str)>,
    pub accept: &'static str,
    pub max_kb: usize,
    pub avatar: bool,
    pub image_editor: bool,
    pub related_links: Vec<LinkView>,
    pub rows: Vec<RepeaterRow>,
    /// Blank row with `__INDEX__` in place of the row index.
    pub template_row: Vec<FieldView>,
}

impl FieldView {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

pub struct RepeaterRow {
    pub index: usize,
    pub fields: Vec<FieldView>,
}

pub struct OptionView {
    pub value: String,
    pub label: String,
    pub description: Option<String>,
    pub selected: bool,
}

pub struct LinkView {
    pub label: String,
    pub href: String,
    pub icon: Option<&'static str>,
}

/// Everything a form needs besides its schema.
pub struct FormContext<'a> {
    pub action: String,
    pub cancel_href: String,
    pub operation: Operation,
    pub env: AppEnv,
    pub data: &'a Map<String, Value>,
    pub errors: &'a ValidationErrors,
    pub options: &'a ResolvedOptions,
    /// URL of the page showing the form, used for related-record links.
    pub page_url: String,
}

impl FormView {
    pub fn build(schema: &FormSchema, ctx: &FormContext<'_>) -> Self {
        let multipart = schema
            .fields()
            .any(|f| matches!(f.kind, FieldKind::FileUpload { .. }));

        let tabs = schema
            .tabs
            .iter()
            .enumerate()
            .map(|(index, tab)| {
                let sections: Vec<SectionView> = tab
                    .sections
                    .iter()
                    .map(|section| SectionView {
                        heading: section.heading,
                        description: section.description,
                        icon: section.icon,
                        collapsible: section.collapsible,
                        groups: section
                            .groups
                            .iter()
                            .map(|group| GroupView {
                                legend: group.legend,
                                columns: group.columns.max(1),
                                fields: group
                                    .fields
                                    .iter()
                                    .map(|field| field_view(field, ctx, field.name, field.name))
                                    .collect(),
                            })
                            .collect(),
                    })
                    .collect();
                let has_errors = sections
                    .iter()
                    .flat_map(|s| s.groups.iter())
                    .flat_map(|g| g.fields.iter())
                    .any(|f| f.has_errors() || f.rows.iter().flat_map(|r| r.fields.iter()).any(FieldView::has_errors));
                TabView {
                    id: format!("tab-{index}"),
                    label: tab.label.map(str::to_string).unwrap_or_default(),
                    has_errors,
                    sections,
                }
            })
            .collect();

        let actions = schema
            .visible_actions(ctx.operation, ctx.env)
            .into_iter()
            .map(|action| LinkView {
                label: action.label.to_string(),
                href: with_query(&ctx.page_url, &[("fill", action.name)]),
                icon: action.icon,
            })
            .collect();

        Self {
            action: ctx.action.clone(),
            multipart,
            submit_label: match ctx.operation {
                Operation::Create => "Create",
                Operation::Edit => "Save changes",
            },
            cancel_href: ctx.cancel_href.clone(),
            tabs,
            actions,
            hidden: Vec::new(),
            has_errors: !ctx.errors.is_empty(),
        }
    }

    pub fn with_hidden(mut self, name: &str, value: impl Into<String>) -> Self {
        self.hidden.push((name.to_string(), value.into()));
        self
    }

    pub fn with_submit_label(mut self, label: &'static str) -> Self {
        self.submit_label = label;
        self
    }
}

/// `input_name` is the submitted name, `error_key` the key validation
/// reports under; they differ inside repeater rows.
fn field_view(field: &Field, ctx: &FormContext<'_>, input_name: &str, error_key: &str) -> FieldView {
    field_view_with(field, ctx, ctx.data.get(field.name), input_name, error_key)
}

fn field_view_with(
    field: &Field,
    ctx: &FormContext<'_>,
    value: Option<&Value>,
    input_name: &str,
    error_key: &str,
) -> FieldView {
    let value = value.or(field.default.as_ref()).unwrap_or(&Value::Null);
    let mut view = FieldView {
        name: input_name.to_string(),
        id: format!("field-{}", input_name.replace(['[', ']', '.'], "-")),
        label: field.label(),
        value: scalar_string(value),
        required: field.is_required(),
        maxlength: field.rules.iter().find_map(|rule| match rule {
            Rule::MaxLength(n) => Some(*n),
            _ => None,
        }),
        helper_text: field.helper_text,
        placeholder: field.placeholder,
        full_width: field.full_width,
        errors: ctx.errors.get(error_key).map(<[String]>::to_vec).unwrap_or_default(),
        columns: 1,
        ..FieldView::default()
    };

    match &field.kind {
        FieldKind::Text => view.widget = "text",
        FieldKind::Email => view.widget = "email",
        FieldKind::RichText { disabled_toolbar_buttons } => {
            view.widget = "richtext";
            view.toolbar = RICH_TEXT_TOOLBAR
                .iter()
                .copied()
                .filter(|(button, _)| !disabled_toolbar_buttons.contains(button))
                .collect();
        }
        FieldKind::DateTime { display_format } => {
            view.widget = "datetime";
            view.display_format = display_format;
            if let Some(parsed) = value.as_str().and_then(parse_date_time) {
                view.value = parsed.format("%Y-%m-%dT%H:%M:%S").to_string();
                view.display_value = parsed.format(display_format).to_string();
            }
        }
        FieldKind::Select { multiple, searchable, live, .. } => {
            view.widget = "select";
            view.multiple = *multiple;
            view.searchable = *searchable;
            view.live = *live;
            view.options = option_views(field, ctx.options, value);
            if let Some(Options::Relationship { depends_on, inline_form, relation }) = field.options() {
                view.depends_on = *depends_on;
                if *inline_form {
                    view.related_links = related_links(*relation, value, &ctx.page_url);
                }
            }
        }
        FieldKind::Toggle => {
            view.widget = "toggle";
            view.checked = value.as_bool().unwrap_or(false);
        }
        FieldKind::CheckboxList { columns, searchable, bulk_toggleable, .. } => {
            view.widget = "checkbox_list";
            view.columns = (*columns).max(1);
            view.searchable = *searchable;
            view.bulk_toggleable = *bulk_toggleable;
            view.options = option_views(field, ctx.options, value);
        }
        FieldKind::FileUpload { max_bytes, image, avatar, image_editor, .. } => {
            view.widget = "file";
            view.accept = if *image { "image/*" } else { "" };
            view.max_kb = max_bytes / 1024;
            view.avatar = *avatar;
            view.image_editor = *image_editor;
        }
        FieldKind::Repeater { schema } => {
            view.widget = "repeater";
            let rows = value.as_array().map(Vec::as_slice).unwrap_or(&[]);
            view.rows = rows
                .iter()
                .enumerate()
                .map(|(index, row)| repeater_row(field.name, schema, ctx, row.as_object(), index))
                .collect();
            if view.rows.is_empty() {
                view.rows.push(repeater_row(field.name, schema, ctx, None, 0));
            }
            view.template_row = schema
                .iter()
                .map(|sub| {
                    let name = format!("{}[__INDEX__][{}]", field.name, sub.name);
                    let mut blank = field_view_with(sub, ctx, None, &name, "");
                    blank.errors.clear();
                    blank
                })
                .collect();
        }
        FieldKind::Placeholder => view.widget = "placeholder",
    }
    view
}

fn repeater_row(
    name: &str,
    schema: &[Field],
    ctx: &FormContext<'_>,
    row: Option<&Map<String, Value>>,
    index: usize,
) -> RepeaterRow {
    RepeaterRow {
        index,
        fields: schema
            .iter()
            .map(|sub| {
                field_view_with(
                    sub,
                    ctx,
                    row.and_then(|r| r.get(sub.name)),
                    &format!("{name}[{index}][{}]", sub.name),
                    &format!("{name}.{index}.{}", sub.name),
                )
            })
            .collect(),
    }
}

fn option_views(field: &Field, options: &ResolvedOptions, value: &Value) -> Vec<OptionView> {
    let selected: Vec<String> = match value {
        Value::Array(items) => items.iter().map(scalar_string).collect(),
        Value::Null => Vec::new(),
        other => vec![scalar_string(other)],
    };
    field_choices(field, options)
        .iter()
        .map(|choice| OptionView {
            selected: selected.contains(&choice.value),
            value: choice.value.clone(),
            label: choice.label.clone(),
            description: choice.description.clone(),
        })
        .collect()
}

/// "Create" and "Edit" links of an inline-managed relationship. Both return
/// to the page showing the form.
fn related_links(relation: Relation, value: &Value, page_url: &str) -> Vec<LinkView> {
    let slug = match relation {
        Relation::Speakers => "speakers",
        Relation::Venues => "venues",
    };
    let return_to = [("return_to", page_url)];
    let mut links = vec![LinkView {
        label: String::from("Create"),
        href: with_query(&format!("/admin/{slug}/create"), &return_to),
        icon: Some("heroicon-o-plus"),
    }];
    if relation == Relation::Venues {
        let id = scalar_string(value);
        if !id.is_empty() {
            links.push(LinkView {
                label: String::from("Edit"),
                href: with_query(&format!("/admin/{slug}/{id}/edit"), &return_to),
                icon: Some("heroicon-o-pencil-square"),
            });
        }
    }
    links
}

fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => String::from("1"),
        Value::Bool(false) | Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// `path` with `params` appended to its query string.
pub fn with_query(path: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key, value);
    }
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{path}{separator}{}", serializer.finish())
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Query-string state of a table page: search, sort, filters, page and
/// column selection. Links rebuild it with single keys replaced.
pub struct TableState {
    pub path: String,
    pub values: FormValues,
}

/// Keys that only apply to the request they arrive with.
const TRANSIENT_KEYS: &[&str] = &["notification", "edit"];

impl TableState {
    pub fn new(path: impl Into<String>, values: FormValues) -> Self {
        Self {
            path: path.into(),
            values,
        }
    }

    /// Column selection, `None` until the user touches the toggles.
    pub fn column_selection(&self) -> Option<Vec<String>> {
        self.values.get("columns_set").map(|_| {
            self.values
                .get_all("columns")
                .into_iter()
                .map(str::to_string)
                .collect()
        })
    }

    /// Current URL with `overrides` replacing any values of the same keys.
    pub fn href(&self, overrides: &[(&str, String)]) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        let mut any = false;
        for (key, value) in self.values.pairs() {
            let base = key.trim_end_matches("[]");
            if TRANSIENT_KEYS.contains(&base) || overrides.iter().any(|(k, _)| *k == base) {
                continue;
            }
            serializer.append_pair(key, value);
            any = true;
        }
        for (key, value) in overrides {
            if !value.is_empty() {
                serializer.append_pair(key, value);
                any = true;
            }
        }
        if any {
            format!("{}?{}", self.path, serializer.finish())
        } else {
            self.path.clone()
        }
    }

    /// Hidden inputs that keep the state across the filter form.
    pub fn hidden_except(&self, keys: &[&str]) -> Vec<(String, String)> {
        self.values
            .pairs()
            .iter()
            .filter(|(key, _)| {
                let base = key.trim_end_matches("[]");
                !TRANSIENT_KEYS.contains(&base) && !keys.contains(&base)
            })
            .cloned()
            .collect()
    }
}

pub struct TableView {
    pub path: String,
    pub searchable: bool,
    pub search: String,
    pub headers: Vec<HeaderView>,
    pub rows: Vec<RowView>,
    pub filters: Vec<FilterView>,
    pub toggles: Vec<ToggleView>,
    pub bulk_actions: Vec<BulkActionView>,
    pub header_actions: Vec<LinkView>,
    pub pagination: Option<PaginationView>,
    /// Hidden inputs of the search and filter form.
    pub filter_state: Vec<(String, String)>,
    /// Hidden inputs of the column toggle form.
    pub toggle_state: Vec<(String, String)>,
    pub reset_href: String,
}

impl TableView {
    pub fn has_bulk_actions(&self) -> bool {
        !self.bulk_actions.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len() + 1 + usize::from(self.has_bulk_actions())
    }
}

pub struct HeaderView {
    pub label: String,
    pub align: &'static str,
    pub sort_href: Option<String>,
    pub sorted: &'static str,
}

pub struct RowView {
    pub id: i64,
    pub cells: Vec<CellView>,
    pub actions: Vec<RowActionView>,
    pub groups: Vec<ActionGroupView>,
}

#[derive(Default)]
pub struct CellView {
    pub kind: &'static str,
    pub text: String,
    pub description: Option<String>,
    pub src: String,
    pub circular: bool,
    pub color: &'static str,
    pub icon: &'static str,
    pub align: &'static str,
}

impl CellView {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text",
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn described(text: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::text(text)
        }
    }

    pub fn image(src: impl Into<String>, alt: impl Into<String>, circular: bool) -> Self {
        Self {
            kind: "image",
            src: src.into(),
            text: alt.into(),
            circular,
            ..Self::default()
        }
    }

    pub fn boolean(value: bool) -> Self {
        Self {
            kind: "boolean",
            text: String::from(if value { "Yes" } else { "No" }),
            icon: if value { "heroicon-o-check-circle" } else { "heroicon-o-x-circle" },
            color: if value { "success" } else { "danger" },
            ..Self::default()
        }
    }

    pub fn icon(icon: &'static str, label: impl Into<String>) -> Self {
        Self {
            kind: "icon",
            icon,
            text: label.into(),
            ..Self::default()
        }
    }

    pub fn badge(label: impl Into<String>, color: Color) -> Self {
        Self {
            kind: "badge",
            text: label.into(),
            color: color.as_str(),
            ..Self::default()
        }
    }

    pub fn utc(value: &DateTime<Utc>, format: &str) -> Self {
        Self::text(value.format(format).to_string())
    }

    pub fn naive(value: &NaiveDateTime, format: &str) -> Self {
        Self::text(value.format(format).to_string())
    }

    /// Cell for a column whose formatting comes from its kind.
    pub fn timestamp(column: &Column, value: &DateTime<Utc>) -> Self {
        match column.kind {
            ColumnKind::DateTime { format } => Self::utc(value, format),
            _ => Self::text(value.to_rfc3339()),
        }
    }
}

pub struct RowActionView {
    pub label: &'static str,
    pub href: String,
    /// `post` actions submit a form; `get` actions are links.
    pub method: &'static str,
    pub color: &'static str,
    pub icon: Option<&'static str>,
    pub disabled: bool,
}

impl RowActionView {
    pub fn link(action: &RowAction, href: String) -> Self {
        Self {
            label: action.label,
            href,
            method: "get",
            color: action.color.as_str(),
            icon: action.icon,
            disabled: false,
        }
    }

    pub fn post(action: &RowAction, href: String) -> Self {
        Self {
            method: "post",
            ..Self::link(action, href)
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

pub struct ActionGroupView {
    pub name: &'static str,
    pub actions: Vec<RowActionView>,
}

pub struct FilterView {
    pub name: String,
    pub label: String,
    pub kind: &'static str,
    pub value: String,
    pub checked: bool,
    pub searchable: bool,
    pub options: Vec<OptionView>,
}

pub struct ToggleView {
    pub name: &'static str,
    pub label: String,
    pub checked: bool,
}

pub struct BulkActionView {
    pub name: &'static str,
    pub label: &'static str,
    pub color: &'static str,
    pub icon: Option<&'static str>,
}

pub struct PaginationView {
    pub page: u32,
    pub last_page: u32,
    pub total: i64,
    pub from: i64,
    pub to: i64,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
    pub per_page: Vec<PerPageView>,
}

pub struct PerPageView {
    pub size: u32,
    pub href: String,
    pub current: bool,
}

impl TableView {
    /// Headers, column toggles and bulk actions from the schema; rows are
    /// added by the caller with [`TableView::push_row`].
    pub fn new(schema: &TableSchema, state: &TableState, visible: &[&Column]) -> Self {
        let current_sort = state.values.get("sort").unwrap_or_default();
        let direction = state
            .values
            .get("direction")
            .map(SortDirection::parse)
            .unwrap_or_default();

        let headers = visible
            .iter()
            .map(|column| {
                let is_current = column.sortable && current_sort == column.name;
                HeaderView {
                    label: column.label(),
                    align: column.align.as_str(),
                    sort_href: column.sortable.then(|| {
                        let next = if is_current { direction.flip() } else { SortDirection::Asc };
                        state.href(&[
                            ("sort", column.name.to_string()),
                            ("direction", next.as_str().to_string()),
                            ("page", String::new()),
                        ])
                    }),
                    sorted: if is_current { direction.as_str() } else { "" },
                }
            })
            .collect();

        let selection = state.column_selection();
        let toggles = schema
            .columns
            .iter()
            .filter(|c| c.toggle != Toggle::Fixed)
            .map(|c| ToggleView {
                name: c.name,
                label: c.label(),
                checked: c.is_visible(selection.as_deref()),
            })
            .collect();

        Self {
            path: state.path.clone(),
            searchable: schema.is_searchable(),
            search: state.values.get("search").unwrap_or_default().to_string(),
            headers,
            rows: Vec::new(),
            filters: Vec::new(),
            toggles,
            bulk_actions: schema
                .bulk_actions
                .iter()
                .map(|a| BulkActionView {
                    name: a.name,
                    label: a.label,
                    color: a.color.as_str(),
                    icon: a.icon,
                })
                .collect(),
            header_actions: Vec::new(),
            pagination: None,
            filter_state: state.hidden_except(&[
                "search",
                "page",
                "new_talk",
                "speakers",
                "has_avatar",
            ]),
            toggle_state: state.hidden_except(&["columns", "columns_set"]),
            reset_href: state.path.clone(),
        }
    }

    pub fn push_row(&mut self, id: i64, cells: Vec<CellView>, actions: Vec<(Option<&'static str>, RowActionView)>) {
        let mut row = RowView {
            id,
            cells,
            actions: Vec::new(),
            groups: Vec::new(),
        };
        for (group, action) in actions {
            match group {
                None => row.actions.push(action),
                Some(name) => match row.groups.iter_mut().find(|g| g.name == name) {
                    Some(existing) => existing.actions.push(action),
                    None => row.groups.push(ActionGroupView {
                        name,
                        actions: vec![action],
                    }),
                },
            }
        }
        self.rows.push(row);
    }

    pub fn paginate(&mut self, state: &TableState, schema: &TableSchema, total: i64, page: u32, per_page: u32) {
        let per_page_i = i64::from(per_page.max(1));
        let last_page = u32::try_from(((total + per_page_i - 1) / per_page_i).max(1)).unwrap_or(u32::MAX);
        let page = page.clamp(1, last_page);
        let from = if total == 0 { 0 } else { i64::from(page - 1) * per_page_i + 1 };
        let to = (i64::from(page) * per_page_i).min(total);

        self.pagination = Some(PaginationView {
            page,
            last_page,
            total,
            from,
            to,
            prev_href: (page > 1).then(|| state.href(&[("page", (page - 1).to_string())])),
            next_href: (page < last_page).then(|| state.href(&[("page", (page + 1).to_string())])),
            per_page: schema
                .per_page_options
                .iter()
                .map(|size| PerPageView {
                    size: *size,
                    href: state.href(&[("per_page", size.to_string()), ("page", String::new())]),
                    current: *size == per_page,
                })
                .collect(),
        });
    }
}

// ---------------------------------------------------------------------------
// Infolists
// ---------------------------------------------------------------------------

pub struct InfoSectionView {
    pub heading: Option<&'static str>,
    pub columns: u8,
    pub entries: Vec<EntryView>,
}

#[derive(Default)]
pub struct EntryView {
    pub label: String,
    pub kind: &'static str,
    pub text: String,
    pub href: String,
    pub color: &'static str,
    pub circular: bool,
    pub items: Vec<String>,
    pub full_row: bool,
}

/// Display value of one infolist entry, supplied by the resource.
pub enum EntryValue {
    Text(String),
    Image(String),
    Badge(&'static str, Color),
    Link { text: String, href: String },
    Html(String),
    List(Vec<String>),
    Empty,
}

impl InfoSectionView {
    pub fn build(infolist: &Infolist, value: impl Fn(&Entry) -> EntryValue) -> Vec<Self> {
        infolist
            .sections
            .iter()
            .map(|section| InfoSectionView {
                heading: section.heading,
                columns: section.columns.max(1),
                entries: section
                    .entries
                    .iter()
                    .map(|entry| {
                        let mut view = EntryView {
                            label: entry.label(),
                            full_row: entry.span == 0,
                            circular: matches!(entry.kind, EntryKind::Image { circular: true }),
                            ..EntryView::default()
                        };
                        match value(entry) {
                            EntryValue::Text(text) => {
                                view.kind = "text";
                                view.text = text;
                            }
                            EntryValue::Image(src) => {
                                view.kind = "image";
                                view.href = src;
                            }
                            EntryValue::Badge(label, color) => {
                                view.kind = "badge";
                                view.text = label.to_string();
                                view.color = color.as_str();
                            }
                            EntryValue::Link { text, href } => {
                                view.kind = "link";
                                view.text = text;
                                view.href = href;
                            }
                            EntryValue::Html(html) => {
                                view.kind = "html";
                                view.text = html;
                            }
                            EntryValue::List(items) => {
                                view.kind = "list";
                                view.items = items;
                            }
                            EntryValue::Empty => view.kind = "empty",
                        }
                        view
                    })
                    .collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{ConferenceResource, Resource, SignUpForm, TalkResource};
    use serde_json::json;

    fn context<'a>(
        data: &'a Map<String, Value>,
        errors: &'a ValidationErrors,
        options: &'a ResolvedOptions,
        env: AppEnv,
    ) -> FormContext<'a> {
        FormContext {
            action: String::from("/admin/conferences/create"),
            cancel_href: String::from("/admin/conferences"),
            operation: Operation::Create,
            env,
            data,
            errors,
            options,
            page_url: String::from("/admin/conferences/create"),
        }
    }

    fn fields(form: &FormView) -> Vec<&FieldView> {
        form.tabs
            .iter()
            .flat_map(|t| t.sections.iter())
            .flat_map(|s| s.groups.iter())
            .flat_map(|g| g.fields.iter())
            .collect()
    }

    #[test]
    fn test_conference_form_defaults_and_fill_action() {
        let data = Map::new();
        let errors = ValidationErrors::default();
        let options = ResolvedOptions::new();

        let form = FormView::build(&ConferenceResource::form(), &context(&data, &errors, &options, AppEnv::Local));
        let name = fields(&form).into_iter().find(|f| f.name == "name").unwrap();
        assert_eq!(name.value, "My Conference");
        assert_eq!(name.label, "Conference Name");
        assert_eq!(name.maxlength, Some(60));
        assert_eq!(form.actions.len(), 1);
        assert_eq!(form.actions[0].href, "/admin/conferences/create?fill=fill_factory");

        let production = FormView::build(
            &ConferenceResource::form(),
            &context(&data, &errors, &options, AppEnv::Production),
        );
        assert!(production.actions.is_empty());
    }

    #[test]
    fn test_description_toolbar_omits_italic() {
        let data = Map::new();
        let errors = ValidationErrors::default();
        let options = ResolvedOptions::new();
        let form = FormView::build(&ConferenceResource::form(), &context(&data, &errors, &options, AppEnv::Local));
        let description = fields(&form).into_iter().find(|f| f.name == "description").unwrap();
        assert!(description.toolbar.iter().all(|(button, _)| *button != "italic"));
        assert!(description.toolbar.iter().any(|(button, _)| *button == "bold"));
    }

    #[test]
    fn test_date_time_display_and_errors() {
        let Value::Object(data) = json!({"start_date": "2025-10-09T09:00:00"}) else {
            unreachable!()
        };
        let mut errors = ValidationErrors::default();
        errors.add("end_date", "The end date field is required.");
        let options = ResolvedOptions::new();
        let form = FormView::build(&ConferenceResource::form(), &context(&data, &errors, &options, AppEnv::Local));

        let all = fields(&form);
        let start = all.iter().find(|f| f.name == "start_date").unwrap();
        assert_eq!(start.display_value, "09.10.2025 09:00:00");
        let end = all.iter().find(|f| f.name == "end_date").unwrap();
        assert_eq!(end.errors, vec!["The end date field is required."]);
        assert!(form.has_errors);
        assert!(form.tabs[0].has_errors);
        assert!(!form.tabs[1].has_errors);
    }

    #[test]
    fn test_repeater_rows_and_row_errors() {
        let Value::Object(data) = json!({
            "attendees": [
                {"name": "Ann", "email": "ann@example.com"},
                {"name": "Bob", "email": "nope"},
            ]
        }) else {
            unreachable!()
        };
        let mut errors = ValidationErrors::default();
        errors.add("attendees.1.email", "The email field must be a valid email address.");
        let options = ResolvedOptions::new();
        let form = FormView::build(&SignUpForm::form(), &context(&data, &errors, &options, AppEnv::Local));

        let repeater = fields(&form).into_iter().find(|f| f.widget == "repeater").unwrap();
        assert_eq!(repeater.rows.len(), 2);
        assert_eq!(repeater.rows[1].fields[1].name, "attendees[1][email]");
        assert_eq!(repeater.rows[1].fields[1].value, "nope");
        assert_eq!(repeater.rows[1].fields[1].errors.len(), 1);
        assert_eq!(repeater.template_row[0].name, "attendees[__INDEX__][name]");
        assert!(form.tabs[0].has_errors);
    }

    #[test]
    fn test_table_state_links() {
        let state = TableState::new(
            "/admin/talks",
            FormValues::parse(b"search=rust&sort=title&direction=asc&page=2&notification=saved"),
        );
        let table = TalkResource::table();
        let visible = table.visible_columns(None);
        let view = TableView::new(&table, &state, &visible);

        let title = &view.headers[0];
        assert_eq!(title.sorted, "asc");
        assert_eq!(
            title.sort_href.as_deref(),
            Some("/admin/talks?search=rust&sort=title&direction=desc")
        );
        assert!(view.headers.iter().any(|h| h.sort_href.is_none()));
        assert_eq!(state.href(&[("page", "3".into())]), "/admin/talks?search=rust&sort=title&direction=asc&page=3");
    }

    #[test]
    fn test_pagination_bounds() {
        let state = TableState::new("/admin/talks", FormValues::default());
        let table = TalkResource::table();
        let mut view = TableView::new(&table, &state, &table.visible_columns(None));
        view.paginate(&state, &table, 23, 3, 10);

        let pagination = view.pagination.unwrap();
        assert_eq!((pagination.page, pagination.last_page), (3, 3));
        assert_eq!((pagination.from, pagination.to), (21, 23));
        assert!(pagination.next_href.is_none());
        assert_eq!(pagination.prev_href.as_deref(), Some("/admin/talks?page=2"));
    }

    #[test]
    fn test_row_actions_grouped() {
        let table = TalkResource::table();
        let state = TableState::new("/admin/talks", FormValues::default());
        let mut view = TableView::new(&table, &state, &table.visible_columns(None));
        let actions = table
            .row_actions
            .iter()
            .map(|a| (a.group, RowActionView::link(a, String::from("#"))))
            .collect();
        view.push_row(1, Vec::new(), actions);

        let row = &view.rows[0];
        assert_eq!(row.actions.len(), 1);
        assert_eq!(row.groups.len(), 1);
        assert_eq!(row.groups[0].actions.len(), 2);
    }
}
