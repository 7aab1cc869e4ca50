use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use crate::engine::EngineError;
use crate::store::StoreError;
use crate::utils::response::{error as error_response, redirect};

pub const SIGN_IN_PATH: &str = "/sign_in";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Sign in required")]
    Unauthenticated,

    #[error("Validation error: {}", .0.join(", "))]
    ValidationError(Vec<String>),

    /// Not allowed to edit; the client is sent back to the event page.
    #[error("Not allowed to edit event {0}")]
    EditDenied(Uuid),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Store error")]
    Store(#[source] StoreError),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => AppError::NotFound(err.to_string()),
            other => AppError::Store(other),
        }
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Unauthenticated => AppError::Unauthenticated,
            EngineError::Validation(problems) => AppError::ValidationError(problems),
            EngineError::EditDenied { event_id } => AppError::EditDenied(event_id),
            EngineError::Forbidden(msg) => AppError::Forbidden(msg),
            EngineError::Store(e) => e.into(),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated | AppError::EditDenied(_) => StatusCode::SEE_OTHER,
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthenticated => "UNAUTHENTICATED",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::EditDenied(_) => "EDIT_DENIED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Store(_) => "DATABASE_ERROR",
        }
    }

    fn log(&self) {
        match self {
            AppError::Unauthenticated | AppError::EditDenied(_) => {}
            AppError::ValidationError(problems) => {
                tracing::info!(?problems, "Rejected invalid input");
            }
            AppError::Forbidden(msg) | AppError::NotFound(msg) => {
                tracing::info!(error = ?self, message = %msg, "Request refused");
            }
            AppError::Store(e) => {
                error!(error = ?e, "Store error");
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();

        match self {
            AppError::Unauthenticated => {
                redirect(SIGN_IN_PATH, "You need to sign in before continuing.")
            }
            AppError::EditDenied(event_id) => redirect(
                &format!("/events/{event_id}"),
                "You are not allowed to edit this event.",
            ),
            AppError::ValidationError(problems) => {
                let message = problems.join(", ");
                error_response(
                    "VALIDATION_ERROR",
                    message,
                    Some(json!({ "problems": problems })),
                    StatusCode::UNPROCESSABLE_ENTITY,
                )
            }
            AppError::Forbidden(ref msg) | AppError::NotFound(ref msg) => {
                error_response(self.code(), msg.clone(), None, self.status_code())
            }
            // Internal details stay in the logs.
            AppError::Store(_) => error_response(
                self.code(),
                "A database error occurred".to_string(),
                None,
                self.status_code(),
            ),
        }
    }
}
