//! Decoding and validation of submitted admin forms.
//!
//! Browser submissions arrive urlencoded (or multipart for uploads) and are
//! decoded against a [`FormSchema`] into a JSON object. JSON API bodies are
//! already objects. Both then go through [`validate`] and are deserialized
//! into the model input types.

pub mod upload;
pub mod validation;

pub use upload::*;
pub use validation::*;

use std::collections::BTreeMap;

use serde_json::{Map, Number, Value};

use crate::schema::{Field, FieldKind, FormSchema};

/// Raw submitted key/value pairs, in submission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormValues {
    pairs: Vec<(String, String)>,
}

impl FormValues {
    /// Parse an `application/x-www-form-urlencoded` body.
    pub fn parse(body: &[u8]) -> Self {
        let pairs = url::form_urlencoded::parse(body)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Last value submitted under `name`. Checkboxes submit a hidden `0`
    /// before the box itself, so the last value wins.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Every value submitted under `name` or `name[]`.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        let bracketed = format!("{name}[]");
        self.pairs
            .iter()
            .filter(|(k, _)| k == name || *k == bracketed)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Rows submitted as `name[index][field]`, ordered by index.
    pub fn rows(&self, name: &str) -> Vec<FormValues> {
        let prefix = format!("{name}[");
        let mut rows: BTreeMap<usize, FormValues> = BTreeMap::new();
        for (key, value) in &self.pairs {
            let Some(rest) = key.strip_prefix(&prefix) else {
                continue;
            };
            let Some((index, field)) = rest.split_once("][") else {
                continue;
            };
            let (Ok(index), Some(field)) = (index.parse::<usize>(), field.strip_suffix(']')) else {
                continue;
            };
            rows.entry(index).or_default().push(field, value.clone());
        }
        rows.into_values().collect()
    }
}

/// Decode submitted values into a JSON object shaped by the schema.
///
/// Blank inputs become `null`, relationship values become numbers where they
/// parse, toggles become booleans. Uploads and placeholders are skipped.
pub fn decode(schema: &FormSchema, values: &FormValues) -> Map<String, Value> {
    decode_fields(schema.fields(), values)
}

fn decode_fields<'a>(fields: impl Iterator<Item = &'a Field>, values: &FormValues) -> Map<String, Value> {
    let mut data = Map::new();
    for field in fields {
        if let Some(value) = decode_field(field, values) {
            data.insert(field.name.to_string(), value);
        }
    }
    data
}

fn decode_field(field: &Field, values: &FormValues) -> Option<Value> {
    let value = match &field.kind {
        FieldKind::FileUpload { .. } | FieldKind::Placeholder => return None,
        FieldKind::Toggle => Value::Bool(values.get(field.name).is_some_and(is_truthy)),
        FieldKind::Repeater { schema } => Value::Array(
            values
                .rows(field.name)
                .iter()
                .map(|row| Value::Object(decode_fields(schema.iter(), row)))
                .collect(),
        ),
        _ if field.is_multi_valued() => Value::Array(
            values
                .get_all(field.name)
                .into_iter()
                .filter(|v| !v.trim().is_empty())
                .map(|v| scalar(field, v))
                .collect(),
        ),
        _ => match values.get(field.name) {
            Some(v) if !v.trim().is_empty() => scalar(field, v),
            _ => Value::Null,
        },
    };
    Some(value)
}

fn scalar(field: &Field, raw: &str) -> Value {
    let raw = raw.trim();
    if field.is_relationship() {
        if let Ok(id) = raw.parse::<i64>() {
            return Value::Number(Number::from(id));
        }
    }
    Value::String(raw.to_string())
}

/// Checkbox and query-string spelling of `true`.
pub fn is_truthy(value: &str) -> bool {
    matches!(value, "1" | "on" | "true" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Options, Relation, Rule};
    use serde_json::json;

    fn schema() -> FormSchema {
        FormSchema::plain(
            2,
            vec![
                Field {
                    rules: vec![Rule::Required],
                    ..Field::new("title", FieldKind::Text)
                },
                Field::new(
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
                ),
                Field::new("new_talk", FieldKind::Toggle),
                Field::new(
                    "speakers",
                    FieldKind::CheckboxList {
                        options: Options::Relationship {
                            relation: Relation::Speakers,
                            depends_on: None,
                            inline_form: false,
                        },
                        columns: 3,
                        searchable: false,
                        bulk_toggleable: false,
                    },
                ),
                Field::new(
                    "attendees",
                    FieldKind::Repeater {
                        schema: vec![
                            Field::new("name", FieldKind::Text),
                            Field::new("email", FieldKind::Email),
                        ],
                    },
                ),
            ],
        )
    }

    #[test]
    fn test_repeated_keys_and_rows() {
        let values = FormValues::parse(
            b"title=Intro+to+Rust&speaker_id=3&new_talk=0&new_talk=1\
              &speakers%5B%5D=1&speakers%5B%5D=2\
              &attendees%5B1%5D%5Bname%5D=Bob&attendees%5B0%5D%5Bname%5D=Ann\
              &attendees%5B0%5D%5Bemail%5D=ann%40example.com",
        );
        let data = decode(&schema(), &values);
        assert_eq!(data["title"], json!("Intro to Rust"));
        assert_eq!(data["speaker_id"], json!(3));
        assert_eq!(data["new_talk"], json!(true));
        assert_eq!(data["speakers"], json!([1, 2]));
        assert_eq!(
            data["attendees"],
            json!([{"name": "Ann", "email": "ann@example.com"}, {"name": "Bob", "email": null}])
        );
    }

    #[test]
    fn test_blank_values() {
        let values = FormValues::parse(b"title=++&speaker_id=");
        let data = decode(&schema(), &values);
        assert_eq!(data["title"], Value::Null);
        assert_eq!(data["speaker_id"], Value::Null);
        assert_eq!(data["new_talk"], json!(false));
        assert_eq!(data["speakers"], json!([]));
        assert_eq!(data["attendees"], json!([]));
    }
}
