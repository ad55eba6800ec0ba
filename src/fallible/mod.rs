//! This module keeps the error type shared by every operation.
//!
//! These errors are for operations that *can* fail because of things the
//! client does not know: whether a username is taken, whether a record still
//! exists, whether their token is still good. Each variant maps to one HTTP
//! status and is rendered in the `{success: false, message}` envelope, so a
//! handler just returns `Result<HttpResponse, Error>` and lets `?` do the
//! rest.

use actix_web::{http::StatusCode, HttpResponse};
use log::error;
use serde_json::json;
use thiserror::Error;

pub type ApiResult<T> = Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Unknown username or wrong password. Deliberately one variant for
    /// both so the response shape never tells which part was wrong.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account exists and the password matched, but the account has
    /// been suspended by an admin.
    #[error("account suspended")]
    AccountSuspended,

    /// No ``Authorization: Bearer <token>`` header on a protected route
    #[error("authentication token required")]
    MissingToken,

    /// The token failed to parse, carries a bad signature or is expired
    #[error("invalid authentication token")]
    InvalidToken,

    /// The caller is authenticated but their role lacks the capability
    #[error("insufficient permissions")]
    Forbidden,

    /// Zero rows matched the id the client sent
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("username is already taken")]
    DuplicateUsername,

    /// Malformed input: a non-numeric id, a body that does not
    /// deserialize, a field violating a policy
    #[error("{0}")]
    Validation(String),

    /// Generic storage failure. Logged server side, opaque on the wire.
    #[error("internal server error")]
    Database(#[from] sqlx::Error),
}

impl actix_web::ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidCredentials | Error::MissingToken | Error::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            Error::AccountSuspended | Error::Forbidden => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::DuplicateUsername => StatusCode::CONFLICT,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let Error::Database(e) = self {
            // the wire gets the opaque message from Display only
            error!("database error: {}", e);
        }

        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "message": self.to_string(),
        }))
    }
}

impl Error {
    /// Maps a sqlx error to [`Error::DuplicateUsername`] if it is the
    /// unique violation on ``users.username``, anything else stays a
    /// database error.
    pub fn from_user_insert(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db) = e {
            if db.message().contains("users.username") {
                return Error::DuplicateUsername;
            }
        }
        Error::Database(e)
    }
}
