//! Error types for campus-messages.

use std::collections::BTreeMap;
use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Client Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Fields(FieldErrors),

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("Unsupported group type: {0}")]
    UnsupportedGroupType(String),

    // === Server Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client Errors
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Fields(_)
            | Self::InvalidRecipient(_)
            | Self::UnsupportedGroupType(_) => StatusCode::BAD_REQUEST,

            // 5xx Server Errors
            Self::Database(_) | Self::Config(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Fields(_) => "VALIDATION_ERROR",
            Self::InvalidRecipient(_) => "INVALID_RECIPIENT",
            Self::UnsupportedGroupType(_) => "UNSUPPORTED_GROUP_TYPE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        if self.is_server_error() {
            tracing::error!(error = %self, code = code, "Server error occurred");
        } else {
            tracing::debug!(error = %self, code = code, "Client error occurred");
        }

        let mut error = json!({
            "code": code,
            "message": self.to_string(),
        });
        if let Self::Fields(fields) = &self {
            error["fields"] = json!(fields);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

/// Validation messages keyed by form field name.
///
/// Forms collect every failing field before returning, so a caller can
/// redisplay all problems at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Create an empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Messages recorded against a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Whether any field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Turn a non-empty set into an error.
    pub fn into_result(self) -> AppResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Fields(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = Self::new();
        for (field, errs) in errors.field_errors() {
            for err in errs {
                fields.add(field.to_string(), describe(err));
            }
        }
        fields
    }
}

fn describe(err: &validator::ValidationError) -> String {
    if let Some(message) = &err.message {
        return message.to_string();
    }

    if err.code == "length" {
        let len = err
            .params
            .get("value")
            .and_then(serde_json::Value::as_str)
            .map_or(0, |v| v.chars().count() as u64);
        let max = err.params.get("max").and_then(serde_json::Value::as_u64);
        let min = err.params.get("min").and_then(serde_json::Value::as_u64);

        return match (min, max) {
            (_, Some(max)) if len > max => {
                format!("Ensure this value has at most {max} characters (it has {len}).")
            }
            (Some(1), _) => "This field is required.".to_string(),
            (Some(min), _) => format!("Ensure this value has at least {min} characters."),
            _ => "Invalid length.".to_string(),
        };
    }

    format!("Invalid value ({}).", err.code)
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Fields(err.into())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use maplit::btreemap;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, max = 5))]
        title: String,
        #[validate(length(min = 1))]
        text: String,
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Fields(FieldErrors::new()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::UnsupportedGroupType("world".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Database("down".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert!(AppError::Database("down".into()).is_server_error());
        assert!(!AppError::InvalidRecipient("x".into()).is_server_error());
    }

    #[test]
    fn test_field_errors_from_validator() {
        let sample = Sample {
            title: "too long".to_string(),
            text: String::new(),
        };
        let fields: FieldErrors = sample.validate().unwrap_err().into();

        let expected = btreemap! {
            "text".to_string() => vec!["This field is required.".to_string()],
            "title".to_string() => vec![
                "Ensure this value has at most 5 characters (it has 8).".to_string()
            ],
        };
        assert_eq!(fields, FieldErrors(expected));
    }

    #[test]
    fn test_field_errors_display() {
        let mut a = FieldErrors::new();
        a.add("body", "This field is required.");
        a.add("recipient", "bad");
        a.add("body", "again");

        assert_eq!(a.get("body").unwrap().len(), 2);
        assert_eq!(
            a.to_string(),
            "body: This field is required.; body: again; recipient: bad"
        );
        assert!(matches!(a.into_result(), Err(AppError::Fields(_))));
        assert!(FieldErrors::new().into_result().is_ok());
    }
}
