//! Request validation against fixed field schemas
//!
//! Every violated constraint is reported, one message per field. Fields not
//! named in the schema pass through untouched.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Non-empty string (whitespace-only counts as empty)
    String,
    /// Whole number; numeric strings are converted
    Integer,
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl Field {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub fields: &'static [Field],
}

impl Schema {
    pub const fn new(fields: &'static [Field]) -> Self {
        Self { fields }
    }

    /// Check `input` and return it with schema fields converted
    pub fn validate(&self, input: &Value) -> Result<Map<String, Value>> {
        let mut output = match input {
            Value::Object(map) => map.clone(),
            Value::Null => Map::new(),
            _ => {
                return Err(AppError::Validation(vec![
                    "\"value\" must be of type object".to_string(),
                ]))
            }
        };

        let mut errors = Vec::new();
        for field in self.fields {
            match output.get(field.name) {
                None => {
                    if field.required {
                        errors.push(format!("\"{}\" is required", field.name));
                    }
                }
                Some(value) => match check(field, value) {
                    Ok(converted) => {
                        output.insert(field.name.to_string(), converted);
                    }
                    Err(message) => errors.push(message),
                },
            }
        }

        if errors.is_empty() {
            Ok(output)
        } else {
            Err(AppError::Validation(errors))
        }
    }

    /// Validate and deserialize into a request type
    pub fn parse<T: DeserializeOwned>(&self, input: &Value) -> Result<T> {
        let map = self.validate(input)?;
        serde_json::from_value(Value::Object(map)).map_err(|e| AppError::Validation(vec![e.to_string()]))
    }
}

fn check(field: &Field, value: &Value) -> std::result::Result<Value, String> {
    match field.kind {
        FieldKind::String => match value {
            Value::String(s) if s.trim().is_empty() => {
                Err(format!("\"{}\" is not allowed to be empty", field.name))
            }
            Value::String(_) => Ok(value.clone()),
            _ => Err(format!("\"{}\" must be a string", field.name)),
        },
        FieldKind::Integer => {
            let number = match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            }
            .filter(|n| n.is_finite())
            .ok_or_else(|| format!("\"{}\" must be a number", field.name))?;

            if number.fract() != 0.0 || number.abs() > i64::MAX as f64 {
                return Err(format!("\"{}\" must be an integer", field.name));
            }
            Ok(Value::from(number as i64))
        }
    }
}
