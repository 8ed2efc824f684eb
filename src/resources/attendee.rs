use crate::schema::*;

/// Attendee rows of the conference sign-up panel.
pub struct SignUpForm;

impl SignUpForm {
    pub const SLUG: &'static str = "attendees";

    /// Fields of one attendee.
    pub fn attendee_fields() -> Vec<Field> {
        vec![
            Field {
                rules: vec![Rule::Required],
                ..Field::new("name", FieldKind::Text)
            },
            Field {
                rules: vec![Rule::Required, Rule::Email],
                ..Field::new("email", FieldKind::Email)
            },
        ]
    }

    pub fn form() -> FormSchema {
        FormSchema::plain(
            1,
            vec![
                Field {
                    label: Some("Total price"),
                    ..Field::new("total_price", FieldKind::Placeholder)
                },
                Field {
                    rules: vec![Rule::Required, Rule::MinItems(1)],
                    ..Field::new(
                        "attendees",
                        FieldKind::Repeater {
                            schema: Self::attendee_fields(),
                        },
                    )
                },
            ],
        )
    }
}

/// Price shown for `rows` attendees: `"$" + rows × price`.
pub fn total_price(rows: usize, price: i64) -> String {
    let rows = i64::try_from(rows).unwrap_or(i64::MAX);
    format!("${}", rows.saturating_mul(price))
}
