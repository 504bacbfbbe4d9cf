use std::collections::BTreeMap;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("Authentication required: {0}")]
    Unauthenticated(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Maximum attempts reached")]
    AttemptsExhausted,

    #[error("Quiz is not available at this time")]
    QuizUnavailable,

    #[error("Quiz already submitted")]
    AlreadySubmitted,

    #[error("Certificate already exists for this course")]
    AlreadyCertified,

    #[error("Validation error: {message}")]
    ValidationError { message: String, fields: FieldErrors },

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::ValidationError {
            message: message.into(),
            fields: FieldErrors::new(),
        }
    }

    pub fn not_found(resource: &str) -> Self {
        AppError::NotFound(format!("{} not found", resource))
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Unauthenticated(_) => "UNAUTHENTICATED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::AttemptsExhausted => "ATTEMPTS_EXHAUSTED",
            AppError::QuizUnavailable => "QUIZ_UNAVAILABLE",
            AppError::AlreadySubmitted => "ALREADY_SUBMITTED",
            AppError::AlreadyCertified => "ALREADY_CERTIFIED",
            AppError::ValidationError { .. } => "VALIDATION_ERROR",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    fn public_message(&self) -> String {
        match self {
            AppError::DatabaseError(_) | AppError::InternalError(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: FieldErrors,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::AttemptsExhausted => StatusCode::FORBIDDEN,
            AppError::QuizUnavailable => StatusCode::FORBIDDEN,
            AppError::AlreadySubmitted => StatusCode::BAD_REQUEST,
            AppError::AlreadyCertified => StatusCode::BAD_REQUEST,
            AppError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            log::error!("{} ({})", self, self.error_code());
        }

        let fields = match self {
            AppError::ValidationError { fields, .. } => fields.clone(),
            _ => FieldErrors::new(),
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.public_message(),
            code: self.status_code().as_u16(),
            fields,
        })
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for AppError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        AppError::InternalError(format!("BSON serialization error: {}", err))
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        collect_field_errors(&err, "", &mut fields);

        AppError::ValidationError {
            message: "Invalid request payload".to_string(),
            fields,
        }
    }
}

/// Flattens nested validator output into `path -> messages`,
/// e.g. `questions[0].text`.
fn collect_field_errors(errors: &ValidationErrors, prefix: &str, out: &mut FieldErrors) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages = out.entry(path).or_default();
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| error.code.to_string());
                    messages.push(message);
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_field_errors(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_field_errors(inner, &format!("{}[{}]", path, index), out);
                }
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Inner {
        #[validate(length(min = 1, message = "Please provide question text"))]
        text: String,
    }

    #[derive(Validate)]
    struct Outer {
        #[validate(length(max = 3))]
        title: String,
        #[validate(nested)]
        questions: Vec<Inner>,
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AppError::not_found("Quiz").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Forbidden("nope".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(AppError::AttemptsExhausted.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::AlreadySubmitted.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::AlreadyCertified.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Unauthenticated("missing".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::DatabaseError("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(AppError::not_found("Quiz").to_string(), "Quiz not found");
        assert_eq!(AppError::AlreadySubmitted.to_string(), "Quiz already submitted");
    }

    #[test]
    fn test_server_errors_hide_details() {
        let err = AppError::DatabaseError("connection refused at 10.0.0.3".into());
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_validation_errors_are_flattened_by_path() {
        let payload = Outer {
            title: "too long".to_string(),
            questions: vec![
                Inner { text: "ok".to_string() },
                Inner { text: String::new() },
            ],
        };

        let err: AppError = payload.validate().unwrap_err().into();
        let AppError::ValidationError { fields, .. } = err else {
            panic!("expected validation error");
        };

        assert!(fields.contains_key("title"));
        assert_eq!(
            fields.get("questions[1].text"),
            Some(&vec!["Please provide question text".to_string()])
        );
        assert!(!fields.contains_key("questions[0].text"));
    }
}
