use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// How attendees get a ticket for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "application_process", rename_all = "snake_case")]
pub enum ApplicationProcess {
    /// The organizer picks attendees and therefore handles their personal data.
    SelectionByOrganizer,
    /// Travis Foundation runs the selection.
    SelectionByTravis,
    /// Attendees apply through the organizer's own form at `application_link`.
    ApplicationByOrganizer,
}

impl ApplicationProcess {
    pub const ALL: [ApplicationProcess; 3] = [
        ApplicationProcess::SelectionByOrganizer,
        ApplicationProcess::SelectionByTravis,
        ApplicationProcess::ApplicationByOrganizer,
    ];

    pub fn requires_data_protection(self) -> bool {
        self == ApplicationProcess::SelectionByOrganizer
    }

    pub fn uses_application_link(self) -> bool {
        self == ApplicationProcess::ApplicationByOrganizer
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Validate)]
#[validate(schema(function = "check_consistency", skip_on_field_errors = false))]
pub struct Event {
    pub id: Uuid,
    pub organizer_id: Uuid,
    #[validate(length(min = 1, message = "Name can't be blank"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(url(message = "Website must be a valid URL"))]
    pub website: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    #[validate(range(min = 1, message = "Number of tickets must be at least 1"))]
    pub number_of_tickets: Option<i32>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub deadline: NaiveDate,
    pub application_process: ApplicationProcess,
    pub application_link: Option<String>,
    pub data_protection_confirmation: bool,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Validation messages for this record, empty when it may be saved.
    pub fn problems(&self) -> Vec<String> {
        let Err(errors) = self.validate() else {
            return Vec::new();
        };
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_values()
            .flatten()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect();
        messages.sort();
        messages
    }
}

/// Cross-field rules: date ordering, then the application process coupling.
fn check_consistency(event: &Event) -> Result<(), ValidationError> {
    if event.end_date < event.start_date {
        return Err(ValidationError::new("end_date")
            .with_message(Cow::Borrowed("End date must not be before the start date")));
    }
    if event.deadline > event.end_date {
        return Err(ValidationError::new("deadline")
            .with_message(Cow::Borrowed("Deadline must not be after the end date")));
    }
    if event.application_process.requires_data_protection() && !event.data_protection_confirmation
    {
        return Err(ValidationError::new("data_protection_confirmation").with_message(
            Cow::Borrowed("You must agree to protect the personal data of applicants"),
        ));
    }
    if event.application_process.uses_application_link() && event.application_link.is_none() {
        return Err(ValidationError::new("application_link")
            .with_message(Cow::Borrowed("Application link can't be blank")));
    }
    Ok(())
}

/// Submission form for a new event, also used for previews.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventForm {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub number_of_tickets: Option<i32>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub deadline: NaiveDate,
    pub application_process: ApplicationProcess,
    #[serde(default)]
    pub application_link: Option<String>,
    #[serde(default, deserialize_with = "checkbox")]
    pub data_protection_confirmation: bool,
}

impl EventForm {
    /// Trim free-text fields; blank strings count as absent.
    pub fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        for field in [
            &mut self.description,
            &mut self.website,
            &mut self.city,
            &mut self.country,
            &mut self.application_link,
        ] {
            *field = field
                .take()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty());
        }
    }

    /// Build the unsaved record this form describes.
    pub fn into_event(self, organizer_id: Uuid, now: DateTime<Utc>) -> Event {
        Event {
            id: Uuid::new_v4(),
            organizer_id,
            name: self.name,
            description: self.description,
            website: self.website,
            city: self.city,
            country: self.country,
            number_of_tickets: self.number_of_tickets,
            start_date: self.start_date,
            end_date: self.end_date,
            deadline: self.deadline,
            application_process: self.application_process,
            application_link: self.application_link,
            data_protection_confirmation: self.data_protection_confirmation,
            approved: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of an event. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventChanges {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub number_of_tickets: Option<i32>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub application_process: Option<ApplicationProcess>,
    #[serde(default)]
    pub application_link: Option<String>,
    #[serde(default, deserialize_with = "optional_checkbox")]
    pub data_protection_confirmation: Option<bool>,
    #[serde(default, deserialize_with = "optional_checkbox")]
    pub approved: Option<bool>,
}

/// Field names of [`EventChanges`], used to build per-role allow-lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventField {
    Name,
    Description,
    Website,
    City,
    Country,
    NumberOfTickets,
    StartDate,
    EndDate,
    Deadline,
    ApplicationProcess,
    ApplicationLink,
    DataProtectionConfirmation,
    Approved,
}

impl EventChanges {
    /// Fields carried by this request.
    pub fn present_fields(&self) -> Vec<EventField> {
        [
            (self.name.is_some(), EventField::Name),
            (self.description.is_some(), EventField::Description),
            (self.website.is_some(), EventField::Website),
            (self.city.is_some(), EventField::City),
            (self.country.is_some(), EventField::Country),
            (self.number_of_tickets.is_some(), EventField::NumberOfTickets),
            (self.start_date.is_some(), EventField::StartDate),
            (self.end_date.is_some(), EventField::EndDate),
            (self.deadline.is_some(), EventField::Deadline),
            (self.application_process.is_some(), EventField::ApplicationProcess),
            (self.application_link.is_some(), EventField::ApplicationLink),
            (
                self.data_protection_confirmation.is_some(),
                EventField::DataProtectionConfirmation,
            ),
            (self.approved.is_some(), EventField::Approved),
        ]
        .into_iter()
        .filter_map(|(present, field)| present.then_some(field))
        .collect()
    }

    /// Drop one field from the request.
    pub fn clear(&mut self, field: EventField) {
        match field {
            EventField::Name => self.name = None,
            EventField::Description => self.description = None,
            EventField::Website => self.website = None,
            EventField::City => self.city = None,
            EventField::Country => self.country = None,
            EventField::NumberOfTickets => self.number_of_tickets = None,
            EventField::StartDate => self.start_date = None,
            EventField::EndDate => self.end_date = None,
            EventField::Deadline => self.deadline = None,
            EventField::ApplicationProcess => self.application_process = None,
            EventField::ApplicationLink => self.application_link = None,
            EventField::DataProtectionConfirmation => self.data_protection_confirmation = None,
            EventField::Approved => self.approved = None,
        }
    }

    /// Write every present field into `event`. Blank text clears optional fields.
    pub fn apply_to(self, event: &mut Event) {
        fn text(value: String) -> Option<String> {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }

        if let Some(name) = self.name {
            event.name = name.trim().to_string();
        }
        if let Some(v) = self.description {
            event.description = text(v);
        }
        if let Some(v) = self.website {
            event.website = text(v);
        }
        if let Some(v) = self.city {
            event.city = text(v);
        }
        if let Some(v) = self.country {
            event.country = text(v);
        }
        if let Some(v) = self.number_of_tickets {
            event.number_of_tickets = Some(v);
        }
        if let Some(v) = self.start_date {
            event.start_date = v;
        }
        if let Some(v) = self.end_date {
            event.end_date = v;
        }
        if let Some(v) = self.deadline {
            event.deadline = v;
        }
        if let Some(v) = self.application_process {
            event.application_process = v;
        }
        if let Some(v) = self.application_link {
            event.application_link = text(v);
        }
        if let Some(v) = self.data_protection_confirmation {
            event.data_protection_confirmation = v;
        }
        if let Some(v) = self.approved {
            event.approved = v;
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Checkbox {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl Checkbox {
    fn checked(self) -> bool {
        match self {
            Checkbox::Bool(b) => b,
            Checkbox::Int(i) => i != 0,
            Checkbox::Text(s) => matches!(s.trim(), "1" | "true" | "on" | "yes"),
        }
    }
}

/// Accepts HTML-form style checkbox values (`"1"`, `"0"`, `"on"`) as well as booleans.
/// `null` is unchecked.
fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Checkbox>::deserialize(deserializer).map(|v| v.is_some_and(Checkbox::checked))
}

fn optional_checkbox<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Checkbox>::deserialize(deserializer).map(|v| v.map(Checkbox::checked))
}
