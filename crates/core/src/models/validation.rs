use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldErrorKind {
    Required,
    Min,
    Max,
    /// The value could not be read as a string.
    String,
    /// The value could not be read as a number.
    Number,
}

/// A single violated rule on one field of a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub message: String,
    pub kind: FieldErrorKind,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl FieldError {
    pub fn required(path: &str, value: Option<Value>) -> Self {
        Self {
            message: format!("{} is required", path),
            kind: FieldErrorKind::Required,
            path: path.to_string(),
            value,
        }
    }

    pub fn min(path: &str, value: f64, min: f64) -> Self {
        Self {
            message: format!("{} must be at least {} (got {})", path, min, value),
            kind: FieldErrorKind::Min,
            path: path.to_string(),
            value: Some(Value::from(value)),
        }
    }

    pub fn max(path: &str, value: f64, max: f64) -> Self {
        Self {
            message: format!("{} must be at most {} (got {})", path, max, value),
            kind: FieldErrorKind::Max,
            path: path.to_string(),
            value: Some(Value::from(value)),
        }
    }

    /// The value has a JSON type the field cannot hold.
    pub fn cast(path: &str, kind: FieldErrorKind, expected: &str, value: Value) -> Self {
        Self {
            message: format!("{} must be {} (got {})", path, expected, value),
            kind,
            path: path.to_string(),
            value: Some(value),
        }
    }
}

/// Field-keyed validation failures, serialized as `{ "<field>": FieldError }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, error: FieldError) {
        self.0.entry(error.path.clone()).or_insert(error);
    }

    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.0.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.values().map(|e| e.message.as_str()).collect();
        write!(f, "{}", messages.join(", "))
    }
}

/// Reads typed fields out of a JSON request body, recording a field error for
/// every value that cannot be converted.
///
/// Each accessor returns `None` when the field is absent and `Some(None)` when
/// it is `null` (or failed to convert).
#[derive(Debug)]
pub struct FieldReader<'a> {
    fields: &'a Map<String, Value>,
    errors: ValidationErrors,
}

impl<'a> FieldReader<'a> {
    pub fn new(body: &'a Value) -> Result<Self> {
        match body {
            Value::Object(fields) => Ok(Self {
                fields,
                errors: ValidationErrors::new(),
            }),
            _ => Err(Error::BadRequest {
                status: 400,
                message: "Request body must be a JSON object".to_string(),
            }),
        }
    }

    pub fn string(&mut self, path: &str) -> Option<Option<String>> {
        self.read(path, FieldErrorKind::String, "a string", cast_string)
    }

    pub fn number(&mut self, path: &str) -> Option<Option<f64>> {
        self.read(path, FieldErrorKind::Number, "a number", cast_number)
    }

    pub fn integer(&mut self, path: &str) -> Option<Option<i32>> {
        self.read(path, FieldErrorKind::Number, "an integer", cast_integer)
    }

    /// Hands back `value` unless some field failed to convert.
    pub fn finish<T>(self, value: T) -> Result<T> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(Error::Validation(self.errors))
        }
    }

    fn read<T>(
        &mut self,
        path: &str,
        kind: FieldErrorKind,
        expected: &str,
        cast: fn(&Value) -> Option<T>,
    ) -> Option<Option<T>> {
        match self.fields.get(path)? {
            Value::Null => Some(None),
            value => match cast(value) {
                Some(converted) => Some(Some(converted)),
                None => {
                    self.errors
                        .add(FieldError::cast(path, kind, expected, value.clone()));
                    Some(None)
                }
            },
        }
    }
}

fn cast_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn cast_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn cast_integer(value: &Value) -> Option<i32> {
    cast_number(value)
        .filter(|n| n.fract() == 0.0 && *n >= f64::from(i32::MIN) && *n <= f64::from(i32::MAX))
        .map(|n| n as i32)
}
