use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::error::{EngineError, EngineResult};
use super::policy::{self, Role};
use crate::mailer::{self, Mailer, Notification};
use crate::models::{ApplicationProcess, Event, EventChanges, EventField, EventForm, User};
use crate::store::{EventQuery, EventStore, StoreError, UserStore};

#[derive(Debug, Clone, Serialize)]
pub struct ListedEvent {
    #[serde(flatten)]
    pub event: Event,
    pub can_apply: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub events: Vec<ListedEvent>,
    /// Whether the "past events" link should be shown.
    pub has_past_events: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    pub can_apply: bool,
    pub can_edit: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormTemplate {
    pub application_processes: Vec<ApplicationProcess>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    /// The unsaved event as it would be stored.
    pub event: Event,
    pub can_apply: bool,
    pub problems: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Submitted {
    pub event: Event,
    pub notice: String,
}

/// Where the actor goes after a successful update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterUpdate {
    AdminOverview,
    Profile(Uuid),
}

impl AfterUpdate {
    pub fn path(&self) -> String {
        match self {
            AfterUpdate::AdminOverview => "/admin".to_string(),
            AfterUpdate::Profile(user_id) => format!("/users/{user_id}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Updated {
    pub event: Event,
    pub next: AfterUpdate,
    /// Request fields the actor was not allowed to write.
    pub ignored: Vec<EventField>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OwnedEvent {
    #[serde(flatten)]
    pub event: Event,
    pub can_edit: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub user: User,
    pub events: Vec<OwnedEvent>,
}

/// Event submission, review and listing.
pub struct EventEngine {
    events: Arc<dyn EventStore>,
    users: Arc<dyn UserStore>,
    mailer: Arc<dyn Mailer>,
    admin_email: String,
}

fn signed_in(actor: Option<&User>) -> EngineResult<&User> {
    actor.ok_or(EngineError::Unauthenticated)
}

/// Turn a submission form into the event it describes, without saving it.
fn draft(form: EventForm, organizer_id: Uuid, now: DateTime<Utc>) -> Event {
    let mut form = form;
    form.normalize();
    let mut event = form.into_event(organizer_id, now);
    policy::normalize_application(&mut event);
    event
}

impl EventEngine {
    pub fn new(
        events: Arc<dyn EventStore>,
        users: Arc<dyn UserStore>,
        mailer: Arc<dyn Mailer>,
        admin_email: impl Into<String>,
    ) -> Self {
        Self {
            events,
            users,
            mailer,
            admin_email: admin_email.into(),
        }
    }

    pub fn new_form(&self, actor: Option<&User>) -> EngineResult<FormTemplate> {
        signed_in(actor)?;
        Ok(FormTemplate {
            application_processes: ApplicationProcess::ALL.to_vec(),
        })
    }

    /// Save a new unapproved event and notify the review team and the organizer.
    pub async fn create(
        &self,
        actor: Option<&User>,
        form: EventForm,
        now: DateTime<Utc>,
    ) -> EngineResult<Submitted> {
        let organizer = signed_in(actor)?;
        let event = draft(form, organizer.id, now);

        let problems = event.problems();
        if !problems.is_empty() {
            tracing::info!(user_id = %organizer.id, ?problems, "Event submission rejected");
            return Err(EngineError::Validation(problems));
        }

        let event = self.events.save(&event).await?;
        tracing::info!(event_id = %event.id, user_id = %organizer.id, "Event submitted");

        self.notify(mailer::event_submitted_to_admin(&self.admin_email, &event, organizer))
            .await;
        self.notify(mailer::event_submitted_to_organizer(&event, organizer))
            .await;

        let notice = format!(
            "Thank you for submitting {}. We will review it shortly.",
            event.name
        );
        Ok(Submitted { event, notice })
    }

    /// Render what a submission would look like. Nothing is saved or sent.
    pub fn preview(
        &self,
        actor: Option<&User>,
        form: EventForm,
        now: DateTime<Utc>,
    ) -> EngineResult<Preview> {
        let organizer = signed_in(actor)?;
        let event = draft(form, organizer.id, now);
        Ok(Preview {
            can_apply: policy::can_apply(&event, now.date_naive()),
            problems: event.problems(),
            event,
        })
    }

    pub async fn listing(&self, now: DateTime<Utc>) -> EngineResult<Listing> {
        let today = now.date_naive();
        let events = self.events.query(&EventQuery::Upcoming { today }).await?;
        let has_past_events = self.events.exists(&EventQuery::Past { today }).await?;
        Ok(Listing {
            events: events
                .into_iter()
                .map(|event| ListedEvent {
                    can_apply: policy::can_apply(&event, today),
                    event,
                })
                .collect(),
            has_past_events,
        })
    }

    pub async fn past(&self, now: DateTime<Utc>) -> EngineResult<Vec<ListedEvent>> {
        let today = now.date_naive();
        let events = self.events.query(&EventQuery::Past { today }).await?;
        Ok(events
            .into_iter()
            .map(|event| ListedEvent {
                can_apply: policy::can_apply(&event, today),
                event,
            })
            .collect())
    }

    pub async fn show(
        &self,
        actor: Option<&User>,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> EngineResult<EventView> {
        let today = now.date_naive();
        let event = self.events.find(id).await?;
        Ok(EventView {
            can_apply: policy::can_apply(&event, today),
            can_edit: actor.is_some_and(|user| policy::can_edit(user, &event, today)),
            event,
        })
    }

    /// Load an event for its edit form.
    pub async fn edit(
        &self,
        actor: Option<&User>,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> EngineResult<Event> {
        let user = signed_in(actor)?;
        let event = self.events.find(id).await?;
        if !policy::can_edit(user, &event, now.date_naive()) {
            tracing::info!(event_id = %id, user_id = %user.id, "Edit denied");
            return Err(EngineError::EditDenied { event_id: id });
        }
        Ok(event)
    }

    /// Apply the fields the actor may write; the rest of the request is ignored.
    pub async fn update(
        &self,
        actor: Option<&User>,
        id: Uuid,
        changes: EventChanges,
        now: DateTime<Utc>,
    ) -> EngineResult<Updated> {
        let user = signed_in(actor)?;
        let current = self.events.find(id).await?;
        if !policy::can_edit(user, &current, now.date_naive()) {
            tracing::info!(event_id = %id, user_id = %user.id, "Update denied");
            return Err(EngineError::EditDenied { event_id: id });
        }

        let role = Role::of(user);
        let mut changes = changes;
        let ignored = policy::permit(&mut changes, role);
        if !ignored.is_empty() {
            tracing::debug!(event_id = %id, user_id = %user.id, %role, ?ignored, "Ignoring fields");
        }

        let mut event = current.clone();
        changes.apply_to(&mut event);
        policy::normalize_application(&mut event);
        event.updated_at = now;

        let problems = event.problems();
        if !problems.is_empty() {
            return Err(EngineError::Validation(problems));
        }

        let event = self.events.save(&event).await?;
        if event.approved && !current.approved {
            tracing::info!(event_id = %id, user_id = %user.id, "Event approved");
        }
        tracing::info!(event_id = %id, user_id = %user.id, %role, "Event updated");

        let next = match role {
            Role::Admin => AfterUpdate::AdminOverview,
            Role::Member => AfterUpdate::Profile(user.id),
        };
        Ok(Updated {
            event,
            next,
            ignored,
        })
    }

    /// Events waiting for review. Admins only.
    pub async fn pending(&self, actor: Option<&User>) -> EngineResult<Vec<Event>> {
        let user = signed_in(actor)?;
        if Role::of(user) != Role::Admin {
            return Err(EngineError::Forbidden("Admin role required".into()));
        }
        Ok(self.events.query(&EventQuery::Pending).await?)
    }

    /// A user's submitted events. Visible to that user and to admins.
    pub async fn profile(
        &self,
        actor: Option<&User>,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> EngineResult<Profile> {
        let viewer = signed_in(actor)?;
        if viewer.id != user_id && Role::of(viewer) != Role::Admin {
            return Err(EngineError::Forbidden(
                "You can only view your own profile".into(),
            ));
        }

        let user = self
            .users
            .find_user(user_id)
            .await?
            .ok_or(StoreError::NotFound {
                entity: "User",
                id: user_id,
            })?;

        let today = now.date_naive();
        let events = self
            .events
            .query(&EventQuery::OrganizedBy(user_id))
            .await?
            .into_iter()
            .map(|event| OwnedEvent {
                can_edit: policy::can_edit(viewer, &event, today),
                event,
            })
            .collect();
        Ok(Profile { user, events })
    }

    async fn notify(&self, notification: Notification) {
        let to = notification.to.clone();
        if let Err(err) = self.mailer.send(notification).await {
            tracing::warn!(error = %err, to = %to, "Failed to send notification");
        }
    }
}
