use thiserror::Error;
use uuid::Uuid;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Sign in required")]
    Unauthenticated,

    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// The actor may not edit this event; they are sent back to its page.
    #[error("Not allowed to edit event {event_id}")]
    EditDenied { event_id: Uuid },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type EngineResult<T> = Result<T, EngineError>;
