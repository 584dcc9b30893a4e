use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use super::field::{Field, FieldKey, FieldKind};
use crate::messages::MessageCatalog;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern must compile")
});

static DEFAULT_VALIDATOR: LazyLock<FormValidator> = LazyLock::new(FormValidator::default);

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ValidationResult {
    pub key: FieldKey,
    pub is_valid: bool,
    pub message: String,
}

impl ValidationResult {
    pub fn valid(key: FieldKey) -> Self {
        Self {
            key,
            is_valid: true,
            message: String::new(),
        }
    }

    pub fn invalid(key: FieldKey, message: impl Into<String>) -> Self {
        Self {
            key,
            is_valid: false,
            message: message.into(),
        }
    }
}

/// Outcome of validating every field of a form, in field order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FormReport {
    results: Vec<ValidationResult>,
}

impl FormReport {
    pub fn is_valid(&self) -> bool {
        self.results.iter().all(|result| result.is_valid)
    }

    pub fn results(&self) -> &[ValidationResult] {
        &self.results
    }

    pub fn get(&self, key: &str) -> Option<&ValidationResult> {
        self.results
            .iter()
            .find(|result| result.key.as_str() == key)
    }

    pub fn first_error(&self) -> Option<&ValidationResult> {
        self.results.iter().find(|result| !result.is_valid)
    }

    pub fn invalid_count(&self) -> usize {
        self.results.iter().filter(|result| !result.is_valid).count()
    }

    pub fn into_results(self) -> Vec<ValidationResult> {
        self.results
    }
}

/// Additional check for one field, run after its kind rule passes.
pub trait FieldRule: Send + Sync {
    fn check(&self, field: &Field) -> Result<(), String>;
}

impl<F> FieldRule for F
where
    F: Fn(&Field) -> Result<(), String> + Send + Sync,
{
    fn check(&self, field: &Field) -> Result<(), String> {
        (self)(field)
    }
}

#[derive(Clone, Default)]
pub struct FormValidator {
    messages: Arc<MessageCatalog>,
    rules: BTreeMap<FieldKey, Vec<Arc<dyn FieldRule>>>,
}

impl FormValidator {
    pub fn new(messages: MessageCatalog) -> Self {
        Self {
            messages: Arc::new(messages),
            rules: BTreeMap::new(),
        }
    }

    pub fn with_rule(mut self, key: impl Into<FieldKey>, rule: impl FieldRule + 'static) -> Self {
        self.rules.entry(key.into()).or_default().push(Arc::new(rule));
        self
    }

    pub fn messages(&self) -> &MessageCatalog {
        &self.messages
    }

    pub fn validate_field(&self, field: &Field) -> ValidationResult {
        let key = field.key.clone();
        if let Err(message) = self.check_kind(field) {
            return ValidationResult::invalid(key, message);
        }
        let extra = self
            .rules
            .get(&field.key)
            .into_iter()
            .flatten()
            .find_map(|rule| rule.check(field).err());
        match extra {
            Some(message) => ValidationResult::invalid(key, message),
            None => ValidationResult::valid(key),
        }
    }

    /// Validates every field; one failure never hides another.
    pub fn validate_form(&self, fields: &[Field]) -> FormReport {
        let results = fields
            .iter()
            .map(|field| self.validate_field(field))
            .collect::<Vec<_>>();
        let report = FormReport { results };
        tracing::debug!(
            fields = fields.len(),
            invalid = report.invalid_count(),
            "validated form"
        );
        report
    }

    fn check_kind(&self, field: &Field) -> Result<(), String> {
        let value = field.raw_value.trim();
        match field.kind {
            FieldKind::RequiredText if value.is_empty() => {
                Err(self.messages.field_required(&field.label))
            }
            FieldKind::Email if value.is_empty() => Err(self.messages.email_required.clone()),
            FieldKind::Email if !is_valid_email(value) => {
                Err(self.messages.email_invalid.clone())
            }
            FieldKind::LongText if value.is_empty() => {
                Err(self.messages.message_required.clone())
            }
            FieldKind::LongText if value.chars().count() < self.messages.min_message_chars => {
                Err(self.messages.message_too_short())
            }
            _ => Ok(()),
        }
    }
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

/// Validates with the built-in messages.
pub fn validate_field(field: &Field) -> ValidationResult {
    DEFAULT_VALIDATOR.validate_field(field)
}

pub fn validate_form(fields: &[Field]) -> FormReport {
    DEFAULT_VALIDATOR.validate_form(fields)
}
