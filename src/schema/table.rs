use serde::Serialize;

use super::{humanize, Alignment, Color, Relation};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnKind {
    /// Plain text, optionally with a secondary description line.
    Text { description: bool },
    Image { circular: bool },
    /// Check / cross icon for a boolean.
    BooleanIcon,
    /// Icon chosen per value.
    Icon,
    Badge,
    DateTime { format: &'static str },
}

/// Column visibility control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Toggle {
    /// Always shown.
    Fixed,
    /// Can be hidden, shown by default.
    Shown,
    /// Can be shown, hidden by default.
    HiddenByDefault,
}

#[derive(Debug, Clone, Serialize)]
pub struct Column {
    pub name: &'static str,
    pub label: Option<&'static str>,
    pub kind: ColumnKind,
    pub searchable: bool,
    pub sortable: bool,
    pub toggle: Toggle,
    pub align: Alignment,
}

impl Column {
    pub fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            label: None,
            kind,
            searchable: false,
            sortable: false,
            toggle: Toggle::Fixed,
            align: Alignment::Start,
        }
    }

    pub fn label(&self) -> String {
        self.label.map(str::to_string).unwrap_or_else(|| humanize(self.name))
    }

    /// Visible when fixed, or when the user's column selection says so.
    /// `selection == None` means the user has not touched the column toggles.
    pub fn is_visible(&self, selection: Option<&[String]>) -> bool {
        match (self.toggle, selection) {
            (Toggle::Fixed, _) => true,
            (Toggle::Shown, None) => true,
            (Toggle::HiddenByDefault, None) => false,
            (_, Some(selected)) => selected.iter().any(|s| s == self.name),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterKind {
    /// All / yes / no.
    Ternary,
    MultiSelect {
        relation: Relation,
        searchable: bool,
        preload: bool,
    },
    /// On/off switch applying a fixed constraint.
    Toggle,
}

#[derive(Debug, Clone, Serialize)]
pub struct Filter {
    pub name: &'static str,
    pub label: Option<&'static str>,
    pub kind: FilterKind,
}

impl Filter {
    pub fn label(&self) -> String {
        self.label.map(str::to_string).unwrap_or_else(|| humanize(self.name))
    }
}

/// Action offered on each table row.
#[derive(Debug, Clone, Serialize)]
pub struct RowAction {
    pub name: &'static str,
    pub label: &'static str,
    pub icon: Option<&'static str>,
    pub color: Color,
    pub requires_confirmation: bool,
    /// Opens in a slide-over panel on top of the table.
    pub overlay: bool,
    /// Actions sharing a group render inside one dropdown.
    pub group: Option<&'static str>,
}

/// Action applied to the selected rows.
#[derive(Debug, Clone, Serialize)]
pub struct BulkAction {
    pub name: &'static str,
    pub label: &'static str,
    pub icon: Option<&'static str>,
    pub color: Color,
    pub requires_confirmation: bool,
}

/// Action shown above the table, operating on the filtered query.
#[derive(Debug, Clone, Serialize)]
pub struct HeaderAction {
    pub name: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableSchema {
    pub columns: Vec<Column>,
    pub filters: Vec<Filter>,
    pub row_actions: Vec<RowAction>,
    pub bulk_actions: Vec<BulkAction>,
    pub header_actions: Vec<HeaderAction>,
    pub per_page_options: Vec<u32>,
}

impl TableSchema {
    pub fn visible_columns(&self, selection: Option<&[String]>) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.is_visible(selection)).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn is_searchable(&self) -> bool {
        self.columns.iter().any(|c| c.searchable)
    }

    pub fn is_sortable_by(&self, name: &str) -> bool {
        self.column(name).is_some_and(|c| c.sortable)
    }

    pub fn row_action(&self, name: &str) -> Option<&RowAction> {
        self.row_actions.iter().find(|a| a.name == name)
    }

    pub fn bulk_action(&self, name: &str) -> Option<&BulkAction> {
        self.bulk_actions.iter().find(|a| a.name == name)
    }

    /// Clamp a requested page size to one of the offered sizes.
    pub fn per_page(&self, requested: Option<u32>) -> u32 {
        let default = self.per_page_options.first().copied().unwrap_or(10);
        requested
            .filter(|n| self.per_page_options.contains(n))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> TableSchema {
        TableSchema {
            columns: vec![
                Column {
                    sortable: true,
                    ..Column::new("title", ColumnKind::Text { description: false })
                },
                Column {
                    toggle: Toggle::HiddenByDefault,
                    ..Column::new("created_at", ColumnKind::DateTime { format: "%F" })
                },
            ],
            filters: Vec::new(),
            row_actions: Vec::new(),
            bulk_actions: Vec::new(),
            header_actions: Vec::new(),
            per_page_options: vec![10, 25, 50],
        }
    }

    #[test]
    fn test_column_visibility() {
        let table = schema();
        let names = |sel: Option<&[String]>| -> Vec<&str> {
            table.visible_columns(sel).iter().map(|c| c.name).collect()
        };
        assert_eq!(names(None), vec!["title"]);
        let selected = vec!["created_at".to_string()];
        assert_eq!(names(Some(&selected)), vec!["title", "created_at"]);
    }

    #[test]
    fn test_per_page_is_clamped() {
        let table = schema();
        assert_eq!(table.per_page(None), 10);
        assert_eq!(table.per_page(Some(25)), 25);
        assert_eq!(table.per_page(Some(1000)), 10);
    }

    #[test]
    fn test_sortable_lookup() {
        let table = schema();
        assert!(table.is_sortable_by("title"));
        assert!(!table.is_sortable_by("created_at"));
        assert!(!table.is_sortable_by("nope"));
    }
}
