use serde_json::json;

use super::{Page, Resource};
use crate::forms::{is_truthy, FormValues};
use crate::models::{EnumChoice, TalkLength, TalkListQuery, TalkSort, TalkWithSpeaker};
use crate::schema::*;
use crate::utils::excerpt_words;

pub struct TalkResource;

impl Resource for TalkResource {
    const SLUG: &'static str = "talks";
    const LABEL: &'static str = "Talk";
    const PLURAL_LABEL: &'static str = "Talks";
    const PAGES: &'static [Page] = &[Page::Index, Page::Create, Page::Edit];

    fn form() -> FormSchema {
        FormSchema::plain(
            1,
            vec![
                Field {
                    rules: vec![Rule::Required, Rule::MaxLength(255)],
                    ..Field::new("title", FieldKind::Text)
                },
                Field {
                    rules: vec![Rule::Required],
                    full_width: true,
                    ..Field::new(
                        "abstract",
                        FieldKind::RichText {
                            disabled_toolbar_buttons: Vec::new(),
                        },
                    )
                },
                Field {
                    label: Some("Speaker"),
                    rules: vec![Rule::Required],
                    ..Field::new(
                        "speaker_id",
                        FieldKind::Select {
                            options: Options::Relationship {
                                relation: Relation::Speakers,
                                depends_on: None,
                                inline_form: false,
                            },
                            multiple: false,
                            searchable: true,
                            live: false,
                        },
                    )
                },
                Field {
                    default: Some(json!("normal")),
                    ..Field::new(
                        "length",
                        FieldKind::Select {
                            options: Options::Static {
                                choices: Choice::from_enum::<TalkLength>(),
                            },
                            multiple: false,
                            searchable: false,
                            live: false,
                        },
                    )
                },
                Field {
                    default: Some(json!(true)),
                    ..Field::new("new_talk", FieldKind::Toggle)
                },
            ],
        )
    }

    fn table() -> TableSchema {
        let hidden_timestamp = |name| Column {
            sortable: true,
            toggle: Toggle::HiddenByDefault,
            ..Column::new(name, ColumnKind::DateTime { format: "%b %e, %Y %H:%M:%S" })
        };
        TableSchema {
            columns: vec![
                Column {
                    searchable: true,
                    sortable: true,
                    ..Column::new("title", ColumnKind::Text { description: true })
                },
                Column {
                    label: Some("Speaker Avatar"),
                    toggle: Toggle::HiddenByDefault,
                    align: Alignment::Center,
                    ..Column::new("speaker.avatar", ColumnKind::Image { circular: true })
                },
                Column {
                    searchable: true,
                    sortable: true,
                    align: Alignment::End,
                    ..Column::new("speaker.name", ColumnKind::Text { description: false })
                },
                Column {
                    align: Alignment::Center,
                    ..Column::new("new_talk", ColumnKind::BooleanIcon)
                },
                Column {
                    sortable: true,
                    align: Alignment::Center,
                    ..Column::new("status", ColumnKind::Badge)
                },
                Column {
                    toggle: Toggle::HiddenByDefault,
                    align: Alignment::Center,
                    ..Column::new("length", ColumnKind::Icon)
                },
                hidden_timestamp("created_at"),
                hidden_timestamp("updated_at"),
            ],
            filters: vec![
                Filter {
                    name: "new_talk",
                    label: None,
                    kind: FilterKind::Ternary,
                },
                Filter {
                    name: "speaker",
                    label: None,
                    kind: FilterKind::MultiSelect {
                        relation: Relation::Speakers,
                        searchable: true,
                        preload: true,
                    },
                },
                Filter {
                    name: "has_avatar",
                    label: Some("Show Only Speakers with Avatar"),
                    kind: FilterKind::Toggle,
                },
            ],
            row_actions: vec![
                RowAction {
                    name: "edit",
                    label: "Edit",
                    icon: Some("heroicon-o-pencil-square"),
                    color: Color::Primary,
                    requires_confirmation: false,
                    overlay: true,
                    group: None,
                },
                RowAction {
                    name: "approve",
                    label: "Approve",
                    icon: Some("heroicon-o-check"),
                    color: Color::Success,
                    requires_confirmation: false,
                    overlay: false,
                    group: Some("review"),
                },
                RowAction {
                    name: "reject",
                    label: "Reject",
                    icon: Some("heroicon-o-x-mark"),
                    color: Color::Danger,
                    requires_confirmation: true,
                    overlay: false,
                    group: Some("review"),
                },
            ],
            bulk_actions: vec![
                BulkAction {
                    name: "approve",
                    label: "Approve",
                    icon: Some("heroicon-o-check"),
                    color: Color::Success,
                    requires_confirmation: false,
                },
                BulkAction {
                    name: "delete",
                    label: "Delete selected",
                    icon: Some("heroicon-o-trash"),
                    color: Color::Danger,
                    requires_confirmation: true,
                },
            ],
            header_actions: vec![HeaderAction {
                name: "export",
                label: "Export",
            }],
            per_page_options: vec![10, 25, 50],
        }
    }
}

/// Secondary line under the title: the first eight words of the abstract.
pub fn description(talk: &TalkWithSpeaker) -> String {
    excerpt_words(&talk.talk.abstract_text, 8)
}

/// Table state from query-string values: search, filters, sort and page.
/// Unknown or unsortable columns fall back to the default order.
pub fn list_query(values: &FormValues) -> TalkListQuery {
    let table = TalkResource::table();
    let sort = values
        .get("sort")
        .filter(|column| table.is_sortable_by(column))
        .and_then(TalkSort::from_column);

    TalkListQuery {
        search: values.get("search").map(str::trim).filter(|s| !s.is_empty()).map(str::to_string),
        new_talk: match values.get("new_talk") {
            Some("1") | Some("true") => Some(true),
            Some("0") | Some("false") => Some(false),
            _ => None,
        },
        speakers: values
            .get_all("speakers")
            .into_iter()
            .filter_map(|id| id.trim().parse().ok())
            .collect(),
        has_avatar: values.get("has_avatar").is_some_and(is_truthy),
        sort,
        direction: values.get("direction").map(SortDirection::parse).unwrap_or_default(),
        page: values.get("page").and_then(|p| p.parse().ok()).filter(|p| *p > 0).unwrap_or(1),
        per_page: table.per_page(values.get("per_page").and_then(|p| p.parse().ok())),
    }
}

/// Label of the export header action for `count` filtered talks.
pub fn export_label(count: i64) -> String {
    format!("Export ({count})")
}

/// Header and row layout of the talk export.
pub const EXPORT_HEADER: [&str; 8] = [
    "id",
    "title",
    "speaker",
    "status",
    "length",
    "new_talk",
    "created_at",
    "updated_at",
];

/// Prefix user text that a spreadsheet would evaluate as a formula.
pub fn spreadsheet_safe(value: &str) -> String {
    if value.starts_with(['=', '+', '-', '@', '\t', '\r']) {
        format!("'{value}")
    } else {
        value.to_string()
    }
}

pub fn export_record(row: &TalkWithSpeaker) -> [String; 8] {
    let talk = &row.talk;
    [
        talk.id.to_string(),
        spreadsheet_safe(&talk.title),
        spreadsheet_safe(&row.speaker_name),
        talk.status.value().to_string(),
        talk.length.value().to_string(),
        talk.new_talk.to_string(),
        talk.created_at.to_rfc3339(),
        talk.updated_at.to_rfc3339(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spreadsheet_safe() {
        assert_eq!(spreadsheet_safe("=HYPERLINK(\"http://x.io\")"), "'=HYPERLINK(\"http://x.io\")");
        assert_eq!(spreadsheet_safe("+1"), "'+1");
        assert_eq!(spreadsheet_safe("@sum"), "'@sum");
        assert_eq!(spreadsheet_safe("Intro to Rust"), "Intro to Rust");
        assert_eq!(spreadsheet_safe(""), "");
    }

    #[test]
    fn test_default_visible_columns() {
        let table = TalkResource::table();
        let names: Vec<&str> = table.visible_columns(None).iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["title", "speaker.name", "new_talk", "status"]);
    }

    #[test]
    fn test_list_query_from_values() {
        let values = FormValues::parse(
            b"search=Intro&new_talk=1&speakers%5B%5D=2&speakers%5B%5D=5&has_avatar=on\
              &sort=speaker.name&direction=desc&page=3&per_page=25",
        );
        let query = list_query(&values);
        assert_eq!(query.search.as_deref(), Some("Intro"));
        assert_eq!(query.new_talk, Some(true));
        assert_eq!(query.speakers, vec![2, 5]);
        assert!(query.has_avatar);
        assert_eq!(query.sort, Some(TalkSort::SpeakerName));
        assert_eq!(query.direction, SortDirection::Desc);
        assert_eq!((query.page, query.per_page), (3, 25));
    }

    #[test]
    fn test_list_query_ignores_unsortable_columns() {
        let query = list_query(&FormValues::parse(b"sort=abstract&per_page=1000&new_talk="));
        assert_eq!(query.sort, None);
        assert_eq!(query.per_page, 10);
        assert_eq!(query.new_talk, None);
        assert_eq!(query.page, 1);
    }

    #[test]
    fn test_reject_requires_confirmation() {
        let table = TalkResource::table();
        assert!(table.row_action("reject").unwrap().requires_confirmation);
        assert!(!table.row_action("approve").unwrap().requires_confirmation);
        assert!(table.row_action("edit").unwrap().overlay);
    }

    #[test]
    fn test_export_label() {
        assert_eq!(export_label(0), "Export (0)");
        assert_eq!(export_label(12), "Export (12)");
    }
}
