use super::{Page, Resource};
use crate::models::Region;
use crate::schema::*;

pub struct VenueResource;

impl Resource for VenueResource {
    const SLUG: &'static str = "venues";
    const LABEL: &'static str = "Venue";
    const PLURAL_LABEL: &'static str = "Venues";
    const PAGES: &'static [Page] = &[Page::Index, Page::Create, Page::Edit];

    fn form() -> FormSchema {
        let required = |name| Field {
            rules: vec![Rule::Required],
            ..Field::new(name, FieldKind::Text)
        };
        FormSchema::plain(
            2,
            vec![
                required("name"),
                required("city"),
                required("country"),
                Field::new("postal_code", FieldKind::Text),
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
                            live: false,
                        },
                    )
                },
            ],
        )
    }

    fn table() -> TableSchema {
        let text = |name| Column::new(name, ColumnKind::Text { description: false });
        TableSchema {
            columns: vec![
                text("name"),
                text("city"),
                text("country"),
                Column {
                    toggle: Toggle::Shown,
                    ..Column::new("postal_code", ColumnKind::Text { description: false })
                },
                Column::new("region", ColumnKind::Badge),
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
            bulk_actions: Vec::new(),
            header_actions: Vec::new(),
            per_page_options: vec![10, 25, 50],
        }
    }
}
