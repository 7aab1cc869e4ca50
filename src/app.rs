//! Wiring of stores, mailer and clock into [`AppState`].

use std::sync::Arc;

use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::engine::{EventEngine, SystemClock};
use crate::mailer::{MailError, Mailer, Outbox, SmtpMailer};
use crate::state::AppState;
use crate::store::{EventStore, MemoryStore, PgStore, StoreError, UserStore};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not open the event store: {0}")]
    Store(#[from] StoreError),

    #[error("Could not set up mail delivery: {0}")]
    Mail(#[from] MailError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

pub async fn build_state(config: Config) -> Result<AppState, StartupError> {
    let (events, users): (Arc<dyn EventStore>, Arc<dyn UserStore>) = match &config.database_url {
        Some(url) => {
            let store = Arc::new(PgStore::connect(url).await?);
            let events: Arc<dyn EventStore> = store.clone();
            let users: Arc<dyn UserStore> = store;
            (events, users)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, events are kept in memory");
            let store = Arc::new(MemoryStore::new());
            let events: Arc<dyn EventStore> = store.clone();
            let users: Arc<dyn UserStore> = store;
            (events, users)
        }
    };

    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(smtp) => {
            tracing::info!(host = %smtp.host, port = smtp.port, "Sending notifications via SMTP");
            Arc::new(SmtpMailer::new(smtp, config.mail_from.clone())?)
        }
        None => {
            tracing::warn!("SMTP_HOST not set, notifications stay in the outbox");
            Arc::new(Outbox::new())
        }
    };

    let engine = EventEngine::new(events, users.clone(), mailer, config.admin_email.clone());

    Ok(AppState {
        config: Arc::new(config),
        engine: Arc::new(engine),
        users,
        clock: Arc::new(SystemClock),
    })
}
