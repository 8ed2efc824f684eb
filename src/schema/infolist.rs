use serde::Serialize;

use super::humanize;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryKind {
    Image { circular: bool },
    Text,
    Badge,
    /// Text linking to a URL computed by the resource.
    Link,
    /// Trusted HTML rendered as-is.
    Html,
    /// Bulleted list of labels.
    List,
}

#[derive(Debug, Clone, Serialize)]
pub struct Entry {
    pub name: &'static str,
    pub label: Option<&'static str>,
    pub kind: EntryKind,
    /// Number of grid columns the entry covers; `0` spans the full row.
    pub span: u8,
}

impl Entry {
    pub fn new(name: &'static str, kind: EntryKind) -> Self {
        Self {
            name,
            label: None,
            kind,
            span: 1,
        }
    }

    pub fn label(&self) -> String {
        self.label.map(str::to_string).unwrap_or_else(|| humanize(self.name))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InfoSection {
    pub heading: Option<&'static str>,
    pub columns: u8,
    pub entries: Vec<Entry>,
}

/// Read-only detail layout of a record.
#[derive(Debug, Clone, Serialize)]
pub struct Infolist {
    pub sections: Vec<InfoSection>,
}

impl Infolist {
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.sections.iter().flat_map(|s| s.entries.iter())
    }
}
