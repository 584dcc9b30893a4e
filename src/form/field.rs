use std::borrow::Cow;
use std::fmt::{Display, Formatter};

use serde::Deserialize;

use crate::config::FieldSpec;

#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FieldKey(Cow<'static, str>);

impl FieldKey {
    pub const fn new(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FieldKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for FieldKey {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

impl From<&'static str> for FieldKey {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

/// Selects the validation rule applied to a field.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    RequiredText,
    Email,
    LongText,
    #[default]
    Unclassified,
}

impl FieldKind {
    /// Maps an input's presentation type (`type` attribute, or `textarea`).
    pub fn classify(input_type: &str) -> Self {
        match input_type.trim().to_ascii_lowercase().as_str() {
            "email" => Self::Email,
            "textarea" => Self::LongText,
            "text" => Self::RequiredText,
            _ => Self::Unclassified,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Field {
    pub key: FieldKey,
    pub label: String,
    pub kind: FieldKind,
    pub raw_value: String,
}

impl Field {
    pub fn new(key: impl Into<FieldKey>, kind: FieldKind, raw_value: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            label: default_label(key.as_str()),
            key,
            kind,
            raw_value: raw_value.into(),
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

/// `first_name` becomes `First name`.
pub fn default_label(key: &str) -> String {
    let spaced = key.replace(['_', '-'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Values captured from a form at submit time, in form order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FormData {
    entries: Vec<(FieldKey, String)>,
}

impl FormData {
    pub fn from_fields(fields: &[Field]) -> Self {
        Self {
            entries: fields
                .iter()
                .map(|field| (field.key.clone(), field.raw_value.clone()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate.as_str() == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &str)> {
        self.entries.iter().map(|(key, value)| (key, value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub trait FieldLens<T>: Copy + Send + Sync + 'static {
    fn key(self) -> FieldKey;
    fn get<'a>(self, model: &'a T) -> &'a String;
    fn set(self, model: &mut T, value: String);
}

/// A form whose inputs can be read as [`Field`]s, written by key, and
/// cleared after a successful submission.
pub trait FormModel: Clone + Send + Sync + 'static {
    type Fields;

    fn fields() -> Self::Fields;

    fn read_fields(&self) -> Vec<Field>;

    /// Returns `false` when the model has no field named `key`.
    fn set_value(&mut self, key: &FieldKey, value: String) -> bool;

    fn clear(&mut self);
}

/// Runtime-described form, e.g. built from `[[form.fields]]` config.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FieldSet {
    fields: Vec<Field>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_specs(specs: &[FieldSpec]) -> Self {
        Self {
            fields: specs
                .iter()
                .map(|spec| {
                    Field::new(spec.name.clone(), spec.kind, String::new()).label(&spec.label)
                })
                .collect(),
        }
    }

    pub fn field(mut self, field: Field) -> Self {
        match self.fields.iter_mut().find(|existing| existing.key == field.key) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
        self
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.key.as_str() == key)
            .map(|field| field.raw_value.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FormModel for FieldSet {
    type Fields = ();

    fn fields() -> Self::Fields {}

    fn read_fields(&self) -> Vec<Field> {
        self.fields.clone()
    }

    fn set_value(&mut self, key: &FieldKey, value: String) -> bool {
        match self.fields.iter_mut().find(|field| &field.key == key) {
            Some(field) => {
                field.raw_value = value;
                true
            }
            None => false,
        }
    }

    fn clear(&mut self) {
        for field in &mut self.fields {
            field.raw_value.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_maps_presentation_types() {
        assert_eq!(FieldKind::classify("email"), FieldKind::Email);
        assert_eq!(FieldKind::classify("TEXTAREA"), FieldKind::LongText);
        assert_eq!(FieldKind::classify("text"), FieldKind::RequiredText);
        assert_eq!(FieldKind::classify("tel"), FieldKind::Unclassified);
    }

    #[test]
    fn default_label_humanizes_key() {
        assert_eq!(default_label("first_name"), "First name");
        assert_eq!(default_label("subject"), "Subject");
        assert_eq!(default_label(""), "");
    }

    #[test]
    fn field_set_writes_and_clears_by_key() {
        let mut set = FieldSet::new()
            .field(Field::new("name", FieldKind::RequiredText, ""))
            .field(Field::new("email", FieldKind::Email, ""));

        assert!(set.set_value(&FieldKey::new("email"), "a@b.co".to_string()));
        assert!(!set.set_value(&FieldKey::new("phone"), "123".to_string()));
        assert_eq!(set.value("email"), Some("a@b.co"));

        set.clear();
        assert_eq!(set.value("email"), Some(""));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn form_data_keeps_form_order() {
        let data = FormData::from_fields(&[
            Field::new("name", FieldKind::RequiredText, "Ada"),
            Field::new("message", FieldKind::LongText, "Hello there!"),
        ]);
        let keys = data.iter().map(|(key, _)| key.as_str()).collect::<Vec<_>>();
        assert_eq!(keys, vec!["name", "message"]);
        assert_eq!(data.get("name"), Some("Ada"));
        assert_eq!(data.get("missing"), None);
    }
}
