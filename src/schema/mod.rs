//! Data-driven descriptors for admin forms, tables and detail views.
//!
//! Resources describe their pages with these plain values; the form decoder,
//! the validator and the askama renderer consume them generically.

pub mod form;
pub mod infolist;
pub mod table;

pub use form::*;
pub use infolist::*;
pub use table::*;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::EnumChoice;

/// Semantic palette shared by badges, icons, actions and notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Primary,
    Success,
    Danger,
    Warning,
    Info,
    Gray,
}

impl Color {
    pub fn as_str(self) -> &'static str {
        match self {
            Color::Primary => "primary",
            Color::Success => "success",
            Color::Danger => "danger",
            Color::Warning => "warning",
            Color::Info => "info",
            Color::Gray => "gray",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn flip(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Start,
    Center,
    End,
}

impl Alignment {
    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Start => "start",
            Alignment::Center => "center",
            Alignment::End => "end",
        }
    }
}

/// One selectable option.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            description: None,
        }
    }

    /// Every variant of a closed enum, in declaration order.
    pub fn from_enum<T: EnumChoice>() -> Vec<Choice> {
        T::ALL
            .iter()
            .map(|v| Choice::new(v.value(), v.label()))
            .collect()
    }

    pub fn from_pairs(pairs: Vec<(i64, String)>) -> Vec<Choice> {
        pairs
            .into_iter()
            .map(|(id, name)| Choice::new(id.to_string(), name))
            .collect()
    }
}

/// Default label for a field or column name: `venue_id` → `Venue`,
/// `speaker.name` → `Speaker name`, `is_published` → `Is published`.
pub fn humanize(name: &str) -> String {
    let trimmed = name.strip_suffix("_id").unwrap_or(name);
    let spaced = trimmed.replace(['_', '.'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TalkStatus;

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("venue_id"), "Venue");
        assert_eq!(humanize("speaker.name"), "Speaker name");
        assert_eq!(humanize("is_published"), "Is published");
        assert_eq!(humanize("title"), "Title");
    }

    #[test]
    fn test_choices_from_enum() {
        let choices = Choice::from_enum::<TalkStatus>();
        let values: Vec<&str> = choices.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["submitted", "approved", "rejected"]);
        assert_eq!(choices[1].label, "Approved");
    }

    #[test]
    fn test_sort_direction() {
        assert_eq!(SortDirection::parse("DESC"), SortDirection::Desc);
        assert_eq!(SortDirection::parse("anything"), SortDirection::Asc);
        assert_eq!(SortDirection::Asc.flip(), SortDirection::Desc);
    }
}
