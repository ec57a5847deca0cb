use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

use crate::http::context::json_response;

#[derive(Debug, thiserror::Error)]
pub enum MediaListError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    InvalidEndpoint(&'static str),

    #[error("Invalid JSON body.")]
    InvalidBody,

    #[error("Invalid username or password.")]
    InvalidCredentials,

    #[error("Invalid session.")]
    InvalidSession,

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    MethodNotAllowed(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Internal(String),
}

impl MediaListError {
    pub fn missing_field(field: &str) -> Self {
        MediaListError::Validation(format!("Field '{field}' is required."))
    }

    pub fn invalid_field(field: &str, expected: &str) -> Self {
        MediaListError::Validation(format!("Field '{field}' must be {expected}."))
    }

    /// JSON payload shared by every failure response.
    pub fn body(&self) -> serde_json::Value {
        serde_json::json!({ "success": false, "reason": self.to_string() })
    }
}

impl ResponseError for MediaListError {
    fn status_code(&self) -> StatusCode {
        match self {
            MediaListError::Validation(_) => StatusCode::BAD_REQUEST,
            MediaListError::InvalidEndpoint(_) => StatusCode::BAD_REQUEST,
            MediaListError::InvalidBody => StatusCode::BAD_REQUEST,
            MediaListError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            MediaListError::InvalidSession => StatusCode::UNAUTHORIZED,
            MediaListError::Forbidden(_) => StatusCode::FORBIDDEN,
            MediaListError::NotFound(_) => StatusCode::NOT_FOUND,
            MediaListError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            MediaListError::Conflict(_) => StatusCode::CONFLICT,
            MediaListError::PasswordHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
            MediaListError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            MediaListError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            MediaListError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        json_response(self.status_code(), &self.body())
    }
}

pub type Result<T> = std::result::Result<T, MediaListError>;
