//! Field-level validation of JSON request bodies.
//!
//! Rules read straight from a `serde_json::Map` so that type mismatches are
//! reported per field instead of failing the whole body, and messages follow
//! the format clients already parse: `{"field": ["The field ..."]}`.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;
use validator::ValidateEmail;

use crate::error::AppError;

/// Validation messages grouped by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a single-message error set.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when no rule failed, otherwise [`AppError::Validation`].
    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .values()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        f.write_str(&joined)
    }
}

/// How a rule treats an absent key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Key must be present and non-blank.
    Required,
    /// Validated only when the key is present; a present blank value fails.
    Sometimes,
    /// Absent or `null` is accepted and yields nothing.
    Nullable,
}

/// Human form of a field name: `phone_number` -> `phone number`.
pub fn display_name(field: &str) -> String {
    field.replace('_', " ")
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Accumulates rule failures over one input object.
pub struct Rules<'a> {
    input: &'a Map<String, Value>,
    errors: FieldErrors,
}

impl<'a> Rules<'a> {
    pub fn new(input: &'a Map<String, Value>) -> Self {
        Self {
            input,
            errors: FieldErrors::new(),
        }
    }

    /// Resolve presence; `Some(value)` means the type rule should run.
    fn present(&mut self, field: &str, presence: Presence) -> Option<&'a Value> {
        let input = self.input;
        match (input.get(field), presence) {
            (None, Presence::Required) => {
                self.required(field);
                None
            }
            (None, _) => None,
            (Some(Value::Null), Presence::Nullable) => None,
            (Some(value), Presence::Nullable) => Some(value),
            (Some(value), _) if is_blank(value) => {
                self.required(field);
                None
            }
            (Some(value), _) => Some(value),
        }
    }

    fn required(&mut self, field: &str) {
        self.errors.add(
            field,
            format!("The {} field is required.", display_name(field)),
        );
    }

    pub fn string(&mut self, field: &str, presence: Presence) -> Option<String> {
        match self.present(field, presence)? {
            Value::String(s) => Some(s.clone()),
            _ => {
                self.errors.add(
                    field,
                    format!("The {} must be a string.", display_name(field)),
                );
                None
            }
        }
    }

    /// Integer rule. Accepts JSON integers and numeric strings; values that do
    /// not fit `T` fail the same way as non-integers.
    pub fn integer<T: TryFrom<i64>>(&mut self, field: &str, presence: Presence) -> Option<T> {
        let value = self.present(field, presence)?;
        let parsed = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        match parsed.and_then(|n| T::try_from(n).ok()) {
            Some(n) => Some(n),
            None => {
                self.errors.add(
                    field,
                    format!("The {} must be an integer.", display_name(field)),
                );
                None
            }
        }
    }

    pub fn email(&mut self, field: &str, value: &str) -> bool {
        if value.validate_email() {
            return true;
        }
        self.errors.add(
            field,
            format!("The {} must be a valid email address.", display_name(field)),
        );
        false
    }

    pub fn min_chars(&mut self, field: &str, value: &str, min: usize) -> bool {
        if value.chars().count() >= min {
            return true;
        }
        self.errors.add(
            field,
            format!(
                "The {} must be at least {min} characters.",
                display_name(field)
            ),
        );
        false
    }

    pub fn max_chars(&mut self, field: &str, value: &str, max: usize) -> bool {
        if value.chars().count() <= max {
            return true;
        }
        self.errors.add(
            field,
            format!(
                "The {} must not be greater than {max} characters.",
                display_name(field)
            ),
        );
        false
    }

    pub fn between(&mut self, field: &str, value: i64, min: i64, max: i64) -> bool {
        if (min..=max).contains(&value) {
            return true;
        }
        self.errors.add(
            field,
            format!(
                "The {} must be between {min} and {max}.",
                display_name(field)
            ),
        );
        false
    }

    pub fn one_of(&mut self, field: &str, value: &str, allowed: &[&str]) -> bool {
        if allowed.contains(&value) {
            return true;
        }
        self.invalid(field);
        false
    }

    /// Failed `in`/`exists` style rule.
    pub fn invalid(&mut self, field: &str) {
        self.errors.add(
            field,
            format!("The selected {} is invalid.", display_name(field)),
        );
    }

    pub fn taken(&mut self, field: &str) {
        self.errors.add(
            field,
            format!("The {} has already been taken.", display_name(field)),
        );
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.has(field)
    }

    pub fn into_errors(self) -> FieldErrors {
        self.errors
    }

    pub fn finish(self) -> Result<(), AppError> {
        self.errors.into_result()
    }
}

/// Validate a path segment as a UUID, the way update/delete routes need it.
pub fn uuid_param(field: &str, raw: &str) -> Result<Uuid, FieldErrors> {
    Uuid::parse_str(raw).map_err(|_| {
        FieldErrors::single(
            field,
            format!("The {} must be a valid UUID.", display_name(field)),
        )
    })
}

/// Validate a path segment as an integer id.
pub fn integer_param(field: &str, raw: &str) -> Result<i32, FieldErrors> {
    raw.trim().parse::<i32>().map_err(|_| {
        FieldErrors::single(
            field,
            format!("The {} must be an integer.", display_name(field)),
        )
    })
}
