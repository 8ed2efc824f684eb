use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::{EnumChoice, Region, Speaker, Venue};
use crate::schema::{Choice, Field, FieldKind, FormSchema, Options, Relation, Rule};

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Formats accepted for date-time inputs. The first is what browsers submit.
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d.%m.%Y %H:%M:%S",
];

/// Per-field error messages, keyed by dotted path (`attendees.0.email`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.0.entry(key.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(Vec::as_slice)
    }

    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|m| m.first()).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors)
    }
}

/// Options of relationship fields, loaded for one render or one submission.
pub type ResolvedOptions = HashMap<&'static str, Vec<Choice>>;

/// Load the options of every relationship field. Venue options follow the
/// region currently selected in `data`.
pub async fn resolve_options(
    pool: &SqlitePool,
    schema: &FormSchema,
    data: &Map<String, Value>,
) -> Result<ResolvedOptions, sqlx::Error> {
    let mut resolved = ResolvedOptions::new();
    for field in schema.fields() {
        let Some(Options::Relationship { relation, depends_on, .. }) = field.options() else {
            continue;
        };
        let pairs = match relation {
            Relation::Speakers => Speaker::options(pool).await?,
            Relation::Venues => match depends_on {
                Some(dependency) => {
                    let region = data
                        .get(*dependency)
                        .and_then(Value::as_str)
                        .and_then(Region::from_value);
                    Venue::options(pool, region).await?
                }
                None => Venue::find_all(pool, None)
                    .await?
                    .into_iter()
                    .map(|v| (v.id, v.name))
                    .collect(),
            },
        };
        resolved.insert(field.name, Choice::from_pairs(pairs));
    }
    Ok(resolved)
}

/// Choices offered by a select or checkbox list.
pub fn field_choices<'a>(field: &'a Field, resolved: &'a ResolvedOptions) -> &'a [Choice] {
    match field.options() {
        Some(Options::Static { choices }) => choices,
        Some(Options::Relationship { .. }) => resolved.get(field.name).map(Vec::as_slice).unwrap_or(&[]),
        None => &[],
    }
}

/// Check `data` against the schema, normalizing it in place: missing fields
/// take their declared default, empty lists replace `null`, date-times are
/// rewritten in ISO form and numeric relationship ids become numbers.
pub fn validate(
    schema: &FormSchema,
    data: &mut Map<String, Value>,
    options: &ResolvedOptions,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    validate_fields(schema.fields(), data, options, "", &mut errors);
    errors.into_result()
}

/// Resolve options, validate and deserialize into a model input.
pub async fn validated<T: DeserializeOwned>(
    pool: &SqlitePool,
    schema: &FormSchema,
    mut data: Map<String, Value>,
) -> Result<T, AppError> {
    let options = resolve_options(pool, schema, &data).await?;
    validate(schema, &mut data, &options)?;
    Ok(serde_json::from_value(Value::Object(data))?)
}

fn validate_fields<'a>(
    fields: impl Iterator<Item = &'a Field>,
    data: &mut Map<String, Value>,
    options: &ResolvedOptions,
    prefix: &str,
    errors: &mut ValidationErrors,
) {
    for field in fields {
        if matches!(field.kind, FieldKind::FileUpload { .. } | FieldKind::Placeholder) {
            continue;
        }
        if !data.contains_key(field.name) {
            if let Some(default) = &field.default {
                data.insert(field.name.to_string(), default.clone());
            }
        }
        let key = format!("{prefix}{}", field.name);
        match data.get_mut(field.name) {
            Some(value) => validate_field(field, value, options, &key, errors),
            None => validate_field(field, &mut Value::Null, options, &key, errors),
        }
    }
}

fn validate_field(
    field: &Field,
    value: &mut Value,
    options: &ResolvedOptions,
    key: &str,
    errors: &mut ValidationErrors,
) {
    let attribute = field.label().to_lowercase();
    let is_list = field.is_multi_valued() || matches!(field.kind, FieldKind::Repeater { .. });
    if is_list && value.is_null() {
        *value = Value::Array(Vec::new());
    }

    if is_blank(value) {
        if field.is_required() {
            errors.add(key, format!("The {attribute} field is required."));
        } else if let Some(min) = min_items(field).filter(|min| *min > 0 && is_list) {
            errors.add(key, format!("The {attribute} field must have at least {min} items."));
        }
        return;
    }

    match &field.kind {
        FieldKind::Text | FieldKind::Email | FieldKind::RichText { .. } => {
            let Some(text) = value.as_str() else {
                errors.add(key, format!("The {attribute} field must be a string."));
                return;
            };
            for rule in &field.rules {
                match rule {
                    Rule::MaxLength(max) if text.chars().count() > *max => errors.add(
                        key,
                        format!("The {attribute} field must not be greater than {max} characters."),
                    ),
                    Rule::Email if !EMAIL.is_match(text) => {
                        errors.add(key, format!("The {attribute} field must be a valid email address."))
                    }
                    _ => {}
                }
            }
        }
        FieldKind::DateTime { .. } => match value.as_str().and_then(parse_date_time) {
            Some(parsed) => *value = Value::String(parsed.format("%Y-%m-%dT%H:%M:%S").to_string()),
            None => errors.add(key, format!("The {attribute} field must be a valid date.")),
        },
        FieldKind::Toggle => {
            if !value.is_boolean() {
                errors.add(key, format!("The {attribute} field must be true or false."));
            }
        }
        FieldKind::Select { .. } | FieldKind::CheckboxList { .. } => {
            let choices = field_choices(field, options);
            if field.is_multi_valued() {
                let Some(items) = value.as_array_mut() else {
                    errors.add(key, format!("The {attribute} field must be an array."));
                    return;
                };
                let mut invalid = false;
                for item in items.iter_mut() {
                    invalid |= !check_choice(field, item, choices);
                }
                if invalid {
                    errors.add(key, format!("The selected {attribute} is invalid."));
                }
                if let Some(min) = min_items(field).filter(|min| items.len() < *min) {
                    errors.add(key, format!("The {attribute} field must have at least {min} items."));
                }
            } else if !check_choice(field, value, choices) {
                errors.add(key, format!("The selected {attribute} is invalid."));
            }
        }
        FieldKind::Repeater { schema } => {
            let Some(rows) = value.as_array_mut() else {
                errors.add(key, format!("The {attribute} field must be an array."));
                return;
            };
            if let Some(min) = min_items(field).filter(|min| rows.len() < *min) {
                errors.add(key, format!("The {attribute} field must have at least {min} items."));
            }
            for (index, row) in rows.iter_mut().enumerate() {
                match row.as_object_mut() {
                    Some(row) => {
                        validate_fields(schema.iter(), row, options, &format!("{key}.{index}."), errors)
                    }
                    None => errors.add(format!("{key}.{index}"), "Each row must be an object."),
                }
            }
        }
        FieldKind::FileUpload { .. } | FieldKind::Placeholder => {}
    }
}

/// Membership test; relationship ids given as strings are rewritten as numbers.
fn check_choice(field: &Field, value: &mut Value, choices: &[Choice]) -> bool {
    let raw = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return false,
    };
    if !choices.iter().any(|c| c.value == raw) {
        return false;
    }
    if field.is_relationship() {
        if let Ok(id) = raw.parse::<i64>() {
            *value = Value::Number(Number::from(id));
        }
    }
    true
}

fn min_items(field: &Field) -> Option<usize> {
    field.rules.iter().find_map(|rule| match rule {
        Rule::MinItems(n) => Some(*n),
        _ => None,
    })
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Parse any accepted date-time spelling.
pub fn parse_date_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}
