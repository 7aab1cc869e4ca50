//! Public listing plus submission and editing of events.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::models::{EventChanges, EventForm};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{redirect, success};

pub const UPDATED_NOTICE: &str = "Event was successfully updated.";

/// Anonymous callers are sent to sign in before their body is looked at.
fn signed_in_body<T>(
    user: &CurrentUser,
    body: Result<Json<T>, JsonRejection>,
) -> Result<T, Response> {
    if user.user().is_none() {
        return Err(AppError::Unauthenticated.into_response());
    }
    body.map(|Json(value)| value).map_err(IntoResponse::into_response)
}

pub async fn index(State(state): State<AppState>) -> Result<Response, AppError> {
    let listing = state.engine.listing(state.clock.now()).await?;
    Ok(success(listing, "Upcoming events").into_response())
}

pub async fn past(State(state): State<AppState>) -> Result<Response, AppError> {
    let events = state.engine.past(state.clock.now()).await?;
    Ok(success(events, "Past events").into_response())
}

pub async fn new(State(state): State<AppState>, user: CurrentUser) -> Result<Response, AppError> {
    let template = state.engine.new_form(user.user())?;
    Ok(success(template, "New event").into_response())
}

pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Result<Json<EventForm>, JsonRejection>,
) -> Result<Response, AppError> {
    let form = match signed_in_body(&user, body) {
        Ok(form) => form,
        Err(response) => return Ok(response),
    };
    let submitted = state
        .engine
        .create(user.user(), form, state.clock.now())
        .await?;
    Ok(redirect("/events", submitted.notice))
}

pub async fn preview(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Result<Json<EventForm>, JsonRejection>,
) -> Result<Response, AppError> {
    let form = match signed_in_body(&user, body) {
        Ok(form) => form,
        Err(response) => return Ok(response),
    };
    let preview = state.engine.preview(user.user(), form, state.clock.now())?;
    Ok(success(preview, "Event preview").into_response())
}

pub async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let view = state.engine.show(user.user(), id, state.clock.now()).await?;
    Ok(success(view, "Event").into_response())
}

pub async fn edit(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = state.engine.edit(user.user(), id, state.clock.now()).await?;
    Ok(success(event, "Edit event").into_response())
}

pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    body: Result<Json<EventChanges>, JsonRejection>,
) -> Result<Response, AppError> {
    let changes = match signed_in_body(&user, body) {
        Ok(changes) => changes,
        Err(response) => return Ok(response),
    };
    let updated = state
        .engine
        .update(user.user(), id, changes, state.clock.now())
        .await?;
    Ok(redirect(&updated.next.path(), UPDATED_NOTICE))
}
