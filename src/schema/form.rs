use serde::Serialize;
use serde_json::Value;

use super::{humanize, Choice};
use crate::config::AppEnv;

/// Whether a form is rendered for a new record or an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Edit,
}

/// Related table whose rows feed a select or checkbox list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Speakers,
    Venues,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Options {
    Static { choices: Vec<Choice> },
    /// Options loaded from the database when the form is rendered or validated.
    Relationship {
        relation: Relation,
        /// Another field whose value restricts the related rows (the venue select
        /// follows the region select).
        depends_on: Option<&'static str>,
        /// Related records can be created/edited in place with their own form.
        inline_form: bool,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Email,
    RichText {
        disabled_toolbar_buttons: Vec<&'static str>,
    },
    DateTime {
        /// chrono format string used when displaying the value
        display_format: &'static str,
    },
    Select {
        options: Options,
        multiple: bool,
        searchable: bool,
        /// Re-render dependent fields as soon as the value changes.
        live: bool,
    },
    Toggle,
    CheckboxList {
        options: Options,
        columns: u8,
        searchable: bool,
        bulk_toggleable: bool,
    },
    FileUpload {
        directory: &'static str,
        max_bytes: usize,
        image: bool,
        avatar: bool,
        image_editor: bool,
    },
    Repeater {
        schema: Vec<Field>,
    },
    Placeholder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", content = "value", rename_all = "snake_case")]
pub enum Rule {
    Required,
    MaxLength(usize),
    Email,
    MinItems(usize),
}

/// A single form input.
#[derive(Debug, Clone, Serialize)]
pub struct Field {
    pub name: &'static str,
    pub label: Option<&'static str>,
    pub kind: FieldKind,
    pub rules: Vec<Rule>,
    pub default: Option<Value>,
    pub helper_text: Option<&'static str>,
    pub placeholder: Option<&'static str>,
    pub full_width: bool,
}

impl Field {
    pub fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label: None,
            kind,
            rules: Vec::new(),
            default: None,
            helper_text: None,
            placeholder: None,
            full_width: false,
        }
    }

    pub fn label(&self) -> String {
        self.label.map(str::to_string).unwrap_or_else(|| humanize(self.name))
    }

    pub fn is_required(&self) -> bool {
        self.rules.contains(&Rule::Required)
    }

    /// Whether the decoded value of this field is a list.
    pub fn is_multi_valued(&self) -> bool {
        matches!(
            self.kind,
            FieldKind::CheckboxList { .. } | FieldKind::Select { multiple: true, .. }
        )
    }

    pub fn options(&self) -> Option<&Options> {
        match &self.kind {
            FieldKind::Select { options, .. } | FieldKind::CheckboxList { options, .. } => Some(options),
            _ => None,
        }
    }

    /// Relationship selects submit numeric ids.
    pub fn is_relationship(&self) -> bool {
        matches!(self.options(), Some(Options::Relationship { .. }))
    }
}

/// Fieldset inside a section.
#[derive(Debug, Clone, Serialize)]
pub struct Group {
    pub legend: Option<&'static str>,
    pub columns: u8,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub heading: Option<&'static str>,
    pub description: Option<&'static str>,
    pub icon: Option<&'static str>,
    pub columns: u8,
    pub collapsible: bool,
    pub groups: Vec<Group>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Tab {
    pub label: Option<&'static str>,
    pub sections: Vec<Section>,
}

/// Extra button rendered below the form.
#[derive(Debug, Clone, Serialize)]
pub struct FormAction {
    pub name: &'static str,
    pub label: &'static str,
    pub icon: Option<&'static str>,
    /// Only offered for this operation.
    pub operation: Operation,
    /// Hidden in production deployments.
    pub non_production_only: bool,
}

impl FormAction {
    pub fn is_visible(&self, operation: Operation, env: AppEnv) -> bool {
        self.operation == operation && !(self.non_production_only && env.is_production())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FormSchema {
    pub tabs: Vec<Tab>,
    pub actions: Vec<FormAction>,
}

impl FormSchema {
    /// Schema without tabs or headings: one plain grid of fields.
    pub fn plain(columns: u8, fields: Vec<Field>) -> Self {
        Self {
            tabs: vec![Tab {
                label: None,
                sections: vec![Section {
                    heading: None,
                    description: None,
                    icon: None,
                    columns,
                    collapsible: false,
                    groups: vec![Group {
                        legend: None,
                        columns,
                        fields,
                    }],
                }],
            }],
            actions: Vec::new(),
        }
    }

    /// Every field, depth first, in rendering order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.tabs
            .iter()
            .flat_map(|t| t.sections.iter())
            .flat_map(|s| s.groups.iter())
            .flat_map(|g| g.fields.iter())
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields().find(|f| f.name == name)
    }

    pub fn visible_actions(&self, operation: Operation, env: AppEnv) -> Vec<&FormAction> {
        self.actions
            .iter()
            .filter(|a| a.is_visible(operation, env))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_defaults() {
        let field = Field {
            rules: vec![Rule::Required],
            ..Field::new("twitter_handle", FieldKind::Text)
        };
        assert_eq!(field.label(), "Twitter handle");
        assert!(field.is_required());
        assert!(!field.is_multi_valued());
    }

    #[test]
    fn test_plain_schema_lists_fields() {
        let schema = FormSchema::plain(
            2,
            vec![
                Field::new("name", FieldKind::Text),
                Field::new("email", FieldKind::Email),
            ],
        );
        let names: Vec<&str> = schema.fields().map(|f| f.name).collect();
        assert_eq!(names, vec!["name", "email"]);
        assert!(schema.field("email").is_some());
        assert!(schema.field("missing").is_none());
    }

    #[test]
    fn test_action_visibility() {
        let action = FormAction {
            name: "fill",
            label: "Fill",
            icon: None,
            operation: Operation::Create,
            non_production_only: true,
        };
        assert!(action.is_visible(Operation::Create, AppEnv::Local));
        assert!(action.is_visible(Operation::Create, AppEnv::Testing));
        assert!(!action.is_visible(Operation::Create, AppEnv::Production));
        assert!(!action.is_visible(Operation::Edit, AppEnv::Local));
    }
}
