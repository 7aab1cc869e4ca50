//! Request authentication.
//!
//! Signing in happens elsewhere; this service only turns an
//! `Authorization: Bearer <token>` header into the current [`User`].

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::models::User;
use crate::state::AppState;
use crate::utils::error::AppError;

pub mod jwt;

pub use jwt::{issue_token, validate_token, Claims};

/// The signed-in user, if any. Never rejects: a bad or missing token is anonymous.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<User>);

impl CurrentUser {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }
}

fn bearer_subject(parts: &Parts, secret: &str) -> Option<Uuid> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?;
    match validate_token(token.trim(), secret) {
        Ok(claims) => Some(claims.sub),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring invalid bearer token");
            None
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(user_id) = bearer_subject(parts, &state.config.jwt_secret) else {
            return Ok(CurrentUser(None));
        };

        let user = state.users.find_user(user_id).await?;
        if user.is_none() {
            tracing::debug!(%user_id, "Token names an unknown user");
        }
        Ok(CurrentUser(user))
    }
}
