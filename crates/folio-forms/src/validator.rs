//! Required-field validation.
//!
//! Permissive by default: a field passes as long as it is non-empty after
//! trimming. Strict mode also checks the shape of email fields.

use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::OnceLock;

use crate::domain::{FieldType, FormDefinition};

static EMAIL_SHAPE: OnceLock<Regex> = OnceLock::new();

fn email_shape() -> &'static Regex {
    EMAIL_SHAPE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(ValidationError),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub missing: BTreeSet<String>,
    pub malformed: BTreeSet<String>,
}

impl ValidationError {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.malformed.is_empty()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |set: &BTreeSet<String>| set.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
        match (self.missing.is_empty(), self.malformed.is_empty()) {
            (false, true) => write!(f, "Please fill in: {}", join(&self.missing)),
            (true, false) => write!(f, "Please check: {}", join(&self.malformed)),
            _ => write!(f, "Please fill in: {}; please check: {}", join(&self.missing), join(&self.malformed)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Validator {
    required: Vec<String>,
    email_fields: Vec<String>,
    strict_email: bool,
}

impl Validator {
    pub fn new(required: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            required: required.into_iter().map(Into::into).collect(),
            email_fields: vec![],
            strict_email: false,
        }
    }

    pub fn for_form(definition: &FormDefinition) -> Self {
        Self {
            required: definition.fields.iter().filter(|f| f.required).map(|f| f.name.clone()).collect(),
            email_fields: definition
                .fields
                .iter()
                .filter(|f| f.field_type == FieldType::Email)
                .map(|f| f.name.clone())
                .collect(),
            strict_email: false,
        }
    }

    pub fn strict_email(mut self, enabled: bool) -> Self {
        self.strict_email = enabled;
        self
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// A required field that is absent from `fields` counts as missing.
    pub fn validate(&self, fields: &BTreeMap<String, String>) -> ValidationResult {
        let mut error = ValidationError::default();

        for name in &self.required {
            let blank = fields.get(name).map_or(true, |v| v.trim().is_empty());
            if blank {
                error.missing.insert(name.clone());
            }
        }

        if self.strict_email {
            for name in &self.email_fields {
                if error.missing.contains(name) {
                    continue;
                }
                if let Some(value) = fields.get(name) {
                    let value = value.trim();
                    if !value.is_empty() && !email_shape().is_match(value) {
                        error.malformed.insert(name.clone());
                    }
                }
            }
        }

        if error.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid(error)
        }
    }
}
