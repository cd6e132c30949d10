use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use derive_more::Display;
use serde::Serialize;
use serde_json::json;

/// A single rule violation reported back to the submitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Display)]
pub enum ServiceError {
    #[display(fmt = "Validation failed")]
    Validation(Vec<FieldViolation>),
    #[display(fmt = "Configuration error: {}", _0)]
    Configuration(String),
    #[display(fmt = "Persistence error: {:#}", _0)]
    Persistence(anyhow::Error),
    #[display(fmt = "Notification error: {:#}", _0)]
    Notification(anyhow::Error),
}

impl std::error::Error for ServiceError {}

pub type Result<T> = std::result::Result<T, ServiceError>;

impl ServiceError {
    pub fn configuration(message: impl Into<String>) -> Self {
        ServiceError::Configuration(message.into())
    }

    pub fn persistence(message: impl std::fmt::Display) -> Self {
        ServiceError::Persistence(anyhow::anyhow!("{}", message))
    }

    pub fn notification(message: impl std::fmt::Display) -> Self {
        ServiceError::Notification(anyhow::anyhow!("{}", message))
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, ServiceError::Configuration(_))
    }
}

impl From<mongodb::error::Error> for ServiceError {
    fn from(err: mongodb::error::Error) -> Self {
        ServiceError::Persistence(err.into())
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Persistence(err.into())
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        ServiceError::Persistence(err.into())
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::Validation(errors) => HttpResponse::build(self.status_code()).json(json!({
                "success": false,
                "errors": errors,
            })),
            _ => HttpResponse::build(self.status_code()).json(json!({
                "success": false,
                "message": "Internal server error",
            })),
        }
    }
}
