//! Outgoing notification emails.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::models::{Event, User};

pub mod outbox;
pub mod smtp;

pub use outbox::Outbox;
pub use smtp::{SmtpConfig, SmtpMailer};

pub const ADMIN_SUBMISSION_SUBJECT: &str = "A new event has been submitted.";
pub const ORGANIZER_SUBMISSION_SUBJECT: &str = "You submitted a new event.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Email build error: {0}")]
    Build(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, notification: Notification) -> Result<(), MailError>;
}

/// Tells the review team that `event` is waiting for approval.
pub fn event_submitted_to_admin(admin_email: &str, event: &Event, organizer: &User) -> Notification {
    Notification {
        to: admin_email.to_string(),
        subject: ADMIN_SUBMISSION_SUBJECT.to_string(),
        body: format!(
            "{} <{}> submitted \"{}\" ({} to {}).\n\nReview it at /events/{}/edit",
            organizer.name, organizer.email, event.name, event.start_date, event.end_date, event.id
        ),
    }
}

/// Confirms the submission to its organizer.
pub fn event_submitted_to_organizer(event: &Event, organizer: &User) -> Notification {
    Notification {
        to: organizer.email.clone(),
        subject: ORGANIZER_SUBMISSION_SUBJECT.to_string(),
        body: format!(
            "Hi {},\n\nthank you for submitting \"{}\". We will review it shortly and let you know \
             once it is listed.\n\nYou can still change it at /events/{}/edit until it is approved \
             or the application deadline ({}) has passed.",
            organizer.name, event.name, event.id, event.deadline
        ),
    }
}
