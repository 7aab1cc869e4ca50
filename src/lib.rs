pub mod app;
pub mod auth;
pub mod config;
pub mod engine;
pub mod handlers;
pub mod mailer;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;
