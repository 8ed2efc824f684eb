use serde_json::json;

use super::{Page, Resource};
use crate::models::{ConferenceStatus, Region};
use crate::schema::*;

/// chrono rendering of `d.m.Y H:i:s`.
pub const DATE_DISPLAY_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

pub const FILL_ACTION: &str = "fill_factory";

pub struct ConferenceResource;

impl Resource for ConferenceResource {
    const SLUG: &'static str = "conferences";
    const LABEL: &'static str = "Conference";
    const PLURAL_LABEL: &'static str = "Conferences";
    const PAGES: &'static [Page] = &[Page::Index, Page::Create, Page::Edit];

    fn form() -> FormSchema {
        let date = |name| Field {
            rules: vec![Rule::Required],
            ..Field::new(
                name,
                FieldKind::DateTime {
                    display_format: DATE_DISPLAY_FORMAT,
                },
            )
        };

        let details = Tab {
            label: Some("Conference Details"),
            sections: vec![Section {
                heading: Some("Conference Details"),
                description: Some("Some description about conference section"),
                icon: Some("heroicon-o-information-circle"),
                columns: 2,
                collapsible: true,
                groups: vec![
                    Group {
                        legend: None,
                        columns: 2,
                        fields: vec![
                            Field {
                                label: Some("Conference Name"),
                                rules: vec![Rule::Required, Rule::MaxLength(60)],
                                default: Some(json!("My Conference")),
                                helper_text: Some("The name of the conference."),
                                full_width: true,
                                ..Field::new("name", FieldKind::Text)
                            },
                            Field {
                                rules: vec![Rule::Required],
                                full_width: true,
                                ..Field::new(
                                    "description",
                                    FieldKind::RichText {
                                        disabled_toolbar_buttons: vec!["italic"],
                                    },
                                )
                            },
                            date("start_date"),
                            date("end_date"),
                        ],
                    },
                    Group {
                        legend: Some("Status"),
                        columns: 2,
                        fields: vec![
                            Field {
                                rules: vec![Rule::Required],
                                placeholder: Some("Select Status"),
                                ..Field::new(
                                    "status",
                                    FieldKind::Select {
                                        options: Options::Static {
                                            choices: Choice::from_enum::<ConferenceStatus>(),
                                        },
                                        multiple: false,
                                        searchable: false,
                                        live: false,
                                    },
                                )
                            },
                            Field {
                                default: Some(json!(true)),
                                ..Field::new("is_published", FieldKind::Toggle)
                            },
                        ],
                    },
                ],
            }],
        };

        let location = Tab {
            label: Some("Location"),
            sections: vec![Section {
                heading: Some("Location"),
                description: None,
                icon: None,
                columns: 2,
                collapsible: true,
                groups: vec![Group {
                    legend: None,
                    columns: 2,
                    fields: vec![
                        Field {
                            rules: vec![Rule::Required],
                            ..Field::new(
                                "region",
                                FieldKind::Select {
                                    options: Options::Static {
                                        choices: Choice::from_enum::<Region>(),
                                    },
                                    multiple: false,
                                    searchable: false,
                                    live: true,
                                },
                            )
                        },
                        Field::new(
                            "venue_id",
                            FieldKind::Select {
                                options: Options::Relationship {
                                    relation: Relation::Venues,
                                    depends_on: Some("region"),
                                    inline_form: true,
                                },
                                multiple: false,
                                searchable: true,
                                live: false,
                            },
                        ),
                    ],
                }],
            }],
        };

        let speakers = Tab {
            label: Some("Speakers"),
            sections: vec![Section {
                heading: None,
                description: None,
                icon: None,
                columns: 1,
                collapsible: false,
                groups: vec![Group {
                    legend: None,
                    columns: 1,
                    fields: vec![Field {
                        rules: vec![Rule::Required],
                        full_width: true,
                        ..Field::new(
                            "speakers",
                            FieldKind::CheckboxList {
                                options: Options::Relationship {
                                    relation: Relation::Speakers,
                                    depends_on: None,
                                    inline_form: false,
                                },
                                columns: 3,
                                searchable: true,
                                bulk_toggleable: true,
                            },
                        )
                    }],
                }],
            }],
        };

        FormSchema {
            tabs: vec![details, location, speakers],
            actions: vec![FormAction {
                name: FILL_ACTION,
                label: "Fill with Factory Data",
                icon: Some("heroicon-o-star"),
                operation: Operation::Create,
                non_production_only: true,
            }],
        }
    }

    fn table() -> TableSchema {
        let date = |name| Column::new(name, ColumnKind::DateTime { format: DATE_DISPLAY_FORMAT });
        TableSchema {
            columns: vec![
                Column::new("name", ColumnKind::Text { description: false }),
                date("start_date"),
                date("end_date"),
                Column {
                    align: Alignment::Center,
                    ..Column::new("status", ColumnKind::Badge)
                },
                Column::new("region", ColumnKind::Badge),
                Column {
                    label: Some("Venue"),
                    ..Column::new("venue.name", ColumnKind::Text { description: false })
                },
                Column {
                    label: Some("Speakers"),
                    align: Alignment::End,
                    toggle: Toggle::Shown,
                    ..Column::new("speaker_count", ColumnKind::Text { description: false })
                },
            ],
            filters: Vec::new(),
            row_actions: vec![RowAction {
                name: "edit",
                label: "Edit",
                icon: Some("heroicon-o-pencil-square"),
                color: Color::Primary,
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppEnv;

    #[test]
    fn test_form_layout() {
        let form = ConferenceResource::form();
        let tabs: Vec<_> = form.tabs.iter().filter_map(|t| t.label).collect();
        assert_eq!(tabs, vec!["Conference Details", "Location", "Speakers"]);

        let name = form.field("name").unwrap();
        assert_eq!(name.label(), "Conference Name");
        assert_eq!(name.default, Some(json!("My Conference")));
        assert!(name.rules.contains(&Rule::MaxLength(60)));

        let venue = form.field("venue_id").unwrap();
        assert!(matches!(
            venue.options(),
            Some(Options::Relationship { depends_on: Some("region"), .. })
        ));
    }

    #[test]
    fn test_fill_action_only_on_create_outside_production() {
        let form = ConferenceResource::form();
        assert_eq!(form.visible_actions(Operation::Create, AppEnv::Local).len(), 1);
        assert!(form.visible_actions(Operation::Edit, AppEnv::Local).is_empty());
        assert!(form.visible_actions(Operation::Create, AppEnv::Production).is_empty());
    }
}
