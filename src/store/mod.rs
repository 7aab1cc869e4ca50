//! Persistence boundary for events and users.
//!
//! Handlers and the engine only see the [`EventStore`] and [`UserStore`]
//! traits; [`postgres::PgStore`] backs production and [`memory::MemoryStore`]
//! backs tests and database-less development runs.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::engine::policy;
use crate::models::{Event, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("Migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Which events a listing wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventQuery {
    /// Approved and not yet over, soonest first.
    Upcoming { today: NaiveDate },
    /// Approved and already over, most recent first.
    Past { today: NaiveDate },
    /// Awaiting approval, oldest submission first.
    Pending,
    /// Submitted by one organizer, newest submission first.
    OrganizedBy(Uuid),
}

impl EventQuery {
    pub fn matches(&self, event: &Event) -> bool {
        match *self {
            EventQuery::Upcoming { today } => policy::is_listed(event, today),
            EventQuery::Past { today } => policy::is_past(event, today),
            EventQuery::Pending => !event.approved,
            EventQuery::OrganizedBy(organizer_id) => event.organizer_id == organizer_id,
        }
    }

    /// Put `events` in this query's listing order.
    pub fn sort(&self, events: &mut [Event]) {
        match self {
            EventQuery::Upcoming { .. } => {
                events.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.name.cmp(&b.name)))
            }
            EventQuery::Past { .. } => {
                events.sort_by(|a, b| b.end_date.cmp(&a.end_date).then(a.name.cmp(&b.name)))
            }
            EventQuery::Pending => events.sort_by_key(|e| e.created_at),
            EventQuery::OrganizedBy(_) => events.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
    }
}

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Insert or update `event`. The organizer of an existing row never changes.
    async fn save(&self, event: &Event) -> Result<Event, StoreError>;

    async fn find(&self, id: Uuid) -> Result<Event, StoreError>;

    async fn query(&self, query: &EventQuery) -> Result<Vec<Event>, StoreError>;

    async fn exists(&self, query: &EventQuery) -> Result<bool, StoreError> {
        Ok(!self.query(query).await?.is_empty())
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn save_user(&self, user: &User) -> Result<User, StoreError>;
}
