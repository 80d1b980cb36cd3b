use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use sqlx::Error as SqlxError;
use std::env::VarError;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

const UNEXPECTED: &str = "An unexpected error has occurred.";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    /// Wrong actor for the operation. Surfaces as 404 like the other lookup failures.
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Upstream error: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] VarError),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl AppError {
    /// Maps unique and foreign key violations to `Conflict`, everything else to `Database`.
    pub fn from_write(err: SqlxError, what: &str) -> Self {
        match &err {
            SqlxError::Database(db) if db.is_unique_violation() => {
                AppError::Conflict(format!("{what} already exists"))
            }
            SqlxError::Database(db) if db.is_foreign_key_violation() => {
                AppError::Conflict(format!("{what} is still referenced"))
            }
            _ => AppError::Database(err),
        }
    }

    fn is_internal(&self) -> bool {
        matches!(
            self,
            AppError::Config(_)
                | AppError::Database(_)
                | AppError::Migrate(_)
                | AppError::Upstream(_)
                | AppError::EnvVar(_)
        )
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) | AppError::Forbidden(_) => StatusCode::NOT_FOUND,
            AppError::InvalidState(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = if self.is_internal() {
            log::error!("{}", self);
            UNEXPECTED.to_owned()
        } else {
            self.to_string()
        };
        HttpResponse::build(self.status_code()).json(ErrorResponse { error })
    }
}

impl From<garde::Report> for AppError {
    fn from(report: garde::Report) -> Self {
        AppError::Validation(report.to_string().trim().to_owned())
    }
}

impl From<AppError> for std::io::Error {
    fn from(err: AppError) -> Self {
        std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
    }
}
