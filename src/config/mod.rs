use std::env;
use std::net::SocketAddr;

use thiserror::Error;

use crate::mailer::smtp::{SmtpConfig, DEFAULT_SMTP_PORT};

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_ADMIN_EMAIL: &str = "admin@woo.hoo";
const DEFAULT_MAIL_FROM: &str = "noreply@diversitytickets.local";
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";
const DEV_JWT_SECRET: &str = "development-secret-change-me";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Postgres connection string. Without it events live in memory.
    pub database_url: Option<String>,
    /// Recipient of "new event submitted" notifications.
    pub admin_email: String,
    pub jwt_secret: String,
    pub mail_from: String,
    /// Unset means notifications stay in the in-memory outbox.
    pub smtp: Option<SmtpConfig>,
    pub cors_allowed_origins: Vec<String>,
    /// Enables HSTS.
    pub production: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_url: None,
            admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            mail_from: DEFAULT_MAIL_FROM.to_string(),
            smtp: None,
            cors_allowed_origins: split_origins(DEFAULT_ALLOWED_ORIGINS),
            production: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source; unset or blank values take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match var("PORT") {
            Some(value) => parse_port("PORT", value)?,
            None => defaults.port,
        };

        let smtp = match var("SMTP_HOST") {
            Some(host) => Some(SmtpConfig {
                host,
                port: match var("SMTP_PORT") {
                    Some(value) => parse_port("SMTP_PORT", value)?,
                    None => DEFAULT_SMTP_PORT,
                },
                user: var("SMTP_USER"),
                password: var("SMTP_PASSWORD"),
            }),
            None => None,
        };

        let jwt_secret = var("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set, using the development secret");
            defaults.jwt_secret.clone()
        });

        Ok(Self {
            host: var("HOST").unwrap_or(defaults.host),
            port,
            database_url: var("DATABASE_URL"),
            admin_email: var("ADMIN_EMAIL").unwrap_or(defaults.admin_email),
            jwt_secret,
            mail_from: var("MAIL_FROM").unwrap_or(defaults.mail_from),
            smtp,
            cors_allowed_origins: var("CORS_ALLOWED_ORIGINS")
                .map(|v| split_origins(&v))
                .unwrap_or(defaults.cors_allowed_origins),
            production: var("RUST_ENV")
                .map(|v| v.to_lowercase() == "production")
                .unwrap_or(false),
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::Invalid {
            name: "HOST",
            expected: "socket address",
            value: addr,
        })
    }
}

fn parse_port(name: &'static str, value: String) -> Result<u16, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        expected: "port number",
        value,
    })
}

fn split_origins(origins: &str) -> Vec<String> {
    origins
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
