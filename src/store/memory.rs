use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{EventQuery, EventStore, StoreError, UserStore};
use crate::models::{Event, User};

/// Process-local store for tests and runs without `DATABASE_URL`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    events: RwLock<HashMap<Uuid, Event>>,
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn event_count(&self) -> usize {
        self.events.read().await.len()
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn save(&self, event: &Event) -> Result<Event, StoreError> {
        let mut events = self.events.write().await;
        let mut stored = event.clone();
        if let Some(existing) = events.get(&event.id) {
            stored.organizer_id = existing.organizer_id;
            stored.created_at = existing.created_at;
        }
        events.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find(&self, id: Uuid) -> Result<Event, StoreError> {
        self.events
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound { entity: "Event", id })
    }

    async fn query(&self, query: &EventQuery) -> Result<Vec<Event>, StoreError> {
        let mut found: Vec<Event> = self
            .events
            .read()
            .await
            .values()
            .filter(|e| query.matches(e))
            .cloned()
            .collect();
        query.sort(&mut found);
        Ok(found)
    }

    async fn exists(&self, query: &EventQuery) -> Result<bool, StoreError> {
        Ok(self.events.read().await.values().any(|e| query.matches(e)))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn save_user(&self, user: &User) -> Result<User, StoreError> {
        self.users.write().await.insert(user.id, user.clone());
        Ok(user.clone())
    }
}
