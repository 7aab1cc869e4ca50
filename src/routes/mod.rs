use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{admin, events, health_check, users};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    let config = state.config.clone();

    Router::new()
        .route("/health", get(health_check))
        .route("/events", get(events::index).post(events::create))
        .route("/events/past", get(events::past))
        .route("/events/new", get(events::new))
        .route("/events/preview", post(events::preview))
        .route(
            "/events/:id",
            get(events::show).put(events::update).patch(events::update),
        )
        .route("/events/:id/edit", get(events::edit))
        .route("/admin", get(admin::overview))
        .route("/users/:id", get(users::show))
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer(&config))
        .layer(create_cors_layer(&config))
        .with_state(state)
}
