use super::{Page, Resource};
use crate::forms::FormValues;
use crate::models::{EnumChoice, Qualification, SpeakerListQuery, SpeakerSort};
use crate::schema::*;

const AVATAR_FALLBACK: &str = "https://ui-avatars.com/api/?background=0D8ABC&color=fff&name=";

/// Speakers can be viewed but not edited once created.
pub struct SpeakerResource;

impl Resource for SpeakerResource {
    const SLUG: &'static str = "speakers";
    const LABEL: &'static str = "Speaker";
    const PLURAL_LABEL: &'static str = "Speakers";
    const PAGES: &'static [Page] = &[Page::Index, Page::Create, Page::View];

    fn form() -> FormSchema {
        FormSchema::plain(
            2,
            vec![
                Field {
                    rules: vec![Rule::Required],
                    ..Field::new("name", FieldKind::Text)
                },
                Field::new(
                    "avatar",
                    FieldKind::FileUpload {
                        directory: "avatars",
                        max_bytes: 10 * 1024 * 1024,
                        image: true,
                        avatar: true,
                        image_editor: true,
                    },
                ),
                Field {
                    rules: vec![Rule::Required, Rule::Email],
                    ..Field::new("email", FieldKind::Email)
                },
                Field {
                    full_width: true,
                    ..Field::new(
                        "bio",
                        FieldKind::RichText {
                            disabled_toolbar_buttons: Vec::new(),
                        },
                    )
                },
                Field::new("twitter_handle", FieldKind::Text),
                Field {
                    full_width: true,
                    ..Field::new(
                        "qualifications",
                        FieldKind::CheckboxList {
                            options: Options::Static {
                                choices: qualification_choices(),
                            },
                            columns: 3,
                            searchable: true,
                            bulk_toggleable: true,
                        },
                    )
                },
            ],
        )
    }

    fn table() -> TableSchema {
        let timestamp = |name| Column {
            sortable: true,
            toggle: Toggle::HiddenByDefault,
            ..Column::new(name, ColumnKind::DateTime { format: "%b %e, %Y %H:%M:%S" })
        };
        let searchable = |name| Column {
            searchable: true,
            ..Column::new(name, ColumnKind::Text { description: false })
        };
        TableSchema {
            columns: vec![
                searchable("name"),
                searchable("email"),
                searchable("twitter_handle"),
                timestamp("created_at"),
                timestamp("updated_at"),
            ],
            filters: Vec::new(),
            row_actions: vec![RowAction {
                name: "view",
                label: "View",
                icon: Some("heroicon-o-eye"),
                color: Color::Gray,
                requires_confirmation: false,
                overlay: false,
                group: None,
            }],
            bulk_actions: vec![BulkAction {
                name: "delete",
                label: "Delete selected",
                icon: Some("heroicon-o-trash"),
                color: Color::Danger,
                requires_confirmation: true,
            }],
            header_actions: Vec::new(),
            per_page_options: vec![10, 25, 50],
        }
    }

    fn infolist() -> Option<Infolist> {
        Some(Infolist {
            sections: vec![
                InfoSection {
                    heading: Some("Personal Information"),
                    columns: 3,
                    entries: vec![
                        Entry::new("avatar", EntryKind::Image { circular: true }),
                        Entry::new("name", EntryKind::Text),
                        Entry::new("email", EntryKind::Text),
                        Entry {
                            label: Some("Twitter"),
                            ..Entry::new("twitter_handle", EntryKind::Link)
                        },
                        Entry::new("has_spoken", EntryKind::Badge),
                    ],
                },
                InfoSection {
                    heading: Some("Other Information"),
                    columns: 1,
                    entries: vec![
                        Entry {
                            span: 0,
                            ..Entry::new("bio", EntryKind::Html)
                        },
                        Entry {
                            span: 0,
                            ..Entry::new("qualifications", EntryKind::List)
                        },
                    ],
                },
            ],
        })
    }
}

fn qualification_choices() -> Vec<Choice> {
    Qualification::ALL
        .iter()
        .map(|q| Choice {
            description: Some(q.description().to_string()),
            ..Choice::new(q.value(), q.label())
        })
        .collect()
}

/// Search and sort state of the speaker table.
pub fn list_query(values: &FormValues) -> SpeakerListQuery {
    let table = SpeakerResource::table();
    SpeakerListQuery {
        search: values.get("search").map(str::trim).filter(|s| !s.is_empty()).map(str::to_string),
        sort: values
            .get("sort")
            .filter(|column| table.is_sortable_by(column))
            .and_then(SpeakerSort::from_column),
        direction: values.get("direction").map(SortDirection::parse).unwrap_or_default(),
    }
}

/// Stored avatar under `/storage`, or a generated initials image.
pub fn avatar_url(avatar: Option<&str>, name: &str) -> String {
    match avatar {
        Some(path) if !path.is_empty() => format!("/storage/{path}"),
        _ => format!("{AVATAR_FALLBACK}{}", urlencoding::encode(name)),
    }
}

/// Display text and target of the Twitter entry.
pub fn twitter_link(handle: &str) -> (String, String) {
    let handle = handle.trim_start_matches('@');
    (format!("@{handle}"), format!("https://twitter.com/{handle}"))
}

/// Label and badge color of the derived "has spoken" entry.
pub fn has_spoken_badge(has_spoken: bool) -> (&'static str, Color) {
    if has_spoken {
        ("Previous Speaker", Color::Success)
    } else {
        ("Has Not Spoken", Color::Primary)
    }
}
