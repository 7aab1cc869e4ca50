use axum::extract::State;
use axum::response::{IntoResponse, Response};

use crate::auth::CurrentUser;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

/// Submissions waiting for approval.
pub async fn overview(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Response, AppError> {
    let pending = state.engine.pending(user.user()).await?;
    Ok(success(pending, "Events awaiting review").into_response())
}
