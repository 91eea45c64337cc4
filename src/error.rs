use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::dotenv::Error as DotError;
use crate::serde_json::json;
use crate::thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("dotenv error: {0}")]
    DotEnvError(#[from] DotError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("form not found: {0}")]
    FormNotFound(String),

    #[error("form is not active: {0}")]
    FormInactive(String),

    #[error("a response from this address has already been recorded")]
    DuplicateSubmission,

    #[error("unauthorized")]
    Unauthorized,

    #[error("server error: {0}")]
    ServerError(String),
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::FormNotFound(_) => StatusCode::NOT_FOUND,
            Error::FormInactive(_) => StatusCode::FORBIDDEN,
            Error::DuplicateSubmission => StatusCode::CONFLICT,
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{}", self);
        }
        HttpResponse::build(status).json(json!({ "error": self.to_string() }))
    }
}
