//! Request-shape validation.
//!
//! A rule set is an ordered slice of `(field, constraint)` pairs. Rules are
//! checked in order and the first violation is returned.
//!
//! ```rust
//! use serde_json::json;
//! use sessions_fixture::validator::{validate, Constraint};
//!
//! let body = json!({ "email": "a@b.c" });
//! let err = validate(
//!     body.as_object().unwrap(),
//!     &[("email", Constraint::Required), ("password", Constraint::Required)],
//! )
//! .unwrap_err();
//! assert_eq!(err.field(), "password");
//! ```

use serde_json::{Map, Value};
use thiserror::Error;

use crate::problem::StructuredError;

/// Constraint token attached to a field.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Constraint {
    /// Present, a string, and not blank.
    Required,
    /// May be absent; if present, same shape as `Required`.
    Optional,
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ValidationError {
    #[error("\"{field}\" é um campo obrigatório.")]
    Missing { field: String },

    #[error("\"{field}\" não pode estar em branco.")]
    Empty { field: String },

    #[error("\"{field}\" deve ser do tipo String.")]
    NotAString { field: String },
}

impl ValidationError {
    pub fn field(&self) -> &str {
        match self {
            Self::Missing { field } | Self::Empty { field } | Self::NotAString { field } => field,
        }
    }

    /// Constraint token reported in the `type` field of the response.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Missing { .. } => "any.required",
            Self::Empty { .. } => "string.empty",
            Self::NotAString { .. } => "string.base",
        }
    }
}

impl From<ValidationError> for StructuredError {
    fn from(err: ValidationError) -> Self {
        StructuredError::validation()
            .with_message(err.to_string())
            .with_key(err.field())
            .with_constraint(err.token())
    }
}

/// Checks `input` against `rules`, failing on the first unmet constraint.
pub fn validate(
    input: &Map<String, Value>,
    rules: &[(&str, Constraint)],
) -> Result<(), ValidationError> {
    for &(field, constraint) in rules {
        match (input.get(field), constraint) {
            (None, Constraint::Optional) => {}
            (None, Constraint::Required) => {
                return Err(ValidationError::Missing { field: field.to_owned() });
            }
            (Some(Value::String(s)), _) if s.trim().is_empty() => {
                return Err(ValidationError::Empty { field: field.to_owned() });
            }
            (Some(Value::String(_)), _) => {}
            (Some(_), _) => {
                return Err(ValidationError::NotAString { field: field.to_owned() });
            }
        }
    }
    Ok(())
}
