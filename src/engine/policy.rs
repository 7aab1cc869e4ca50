//! Pure visibility, permission and field-filtering rules for events.
//!
//! Every time-dependent rule takes `today` explicitly and compares calendar
//! days, so an event whose deadline is today is still open.

use chrono::NaiveDate;

use crate::models::{Event, EventChanges, EventField, User};

/// What a signed-in actor is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Member,
}

impl Role {
    pub fn of(user: &User) -> Self {
        if user.admin {
            Role::Admin
        } else {
            Role::Member
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => f.write_str("admin"),
            Role::Member => f.write_str("member"),
        }
    }
}

const MEMBER_FIELDS: &[EventField] = &[
    EventField::Name,
    EventField::Description,
    EventField::Website,
    EventField::City,
    EventField::Country,
    EventField::NumberOfTickets,
    EventField::StartDate,
    EventField::EndDate,
    EventField::Deadline,
    EventField::ApplicationProcess,
    EventField::ApplicationLink,
    EventField::DataProtectionConfirmation,
];

const ADMIN_FIELDS: &[EventField] = &[
    EventField::Name,
    EventField::Description,
    EventField::Website,
    EventField::City,
    EventField::Country,
    EventField::NumberOfTickets,
    EventField::StartDate,
    EventField::EndDate,
    EventField::Deadline,
    EventField::ApplicationProcess,
    EventField::ApplicationLink,
    EventField::DataProtectionConfirmation,
    EventField::Approved,
];

/// Fields `role` may write through an update.
pub fn mutable_fields(role: Role) -> &'static [EventField] {
    match role {
        Role::Admin => ADMIN_FIELDS,
        Role::Member => MEMBER_FIELDS,
    }
}

/// Strip every field `role` may not write, returning the dropped ones.
///
/// `approved: false` is dropped for everyone: approval never reverts.
pub fn permit(changes: &mut EventChanges, role: Role) -> Vec<EventField> {
    let allowed = mutable_fields(role);
    let mut dropped: Vec<EventField> = changes
        .present_fields()
        .into_iter()
        .filter(|field| !allowed.contains(field))
        .collect();
    if changes.approved == Some(false) && !dropped.contains(&EventField::Approved) {
        dropped.push(EventField::Approved);
    }
    for field in &dropped {
        changes.clear(*field);
    }
    dropped
}

/// Shown in the public listing.
pub fn is_listed(event: &Event, today: NaiveDate) -> bool {
    event.approved && event.end_date >= today
}

/// Shown in the past events archive.
pub fn is_past(event: &Event, today: NaiveDate) -> bool {
    event.approved && event.end_date < today
}

/// Applications are still accepted.
pub fn can_apply(event: &Event, today: NaiveDate) -> bool {
    event.deadline >= today
}

pub fn can_edit(user: &User, event: &Event, today: NaiveDate) -> bool {
    match Role::of(user) {
        Role::Admin => true,
        Role::Member => {
            user.id == event.organizer_id && !event.approved && event.deadline >= today
        }
    }
}

/// Drop application data that does not belong to the chosen process.
pub fn normalize_application(event: &mut Event) {
    if !event.application_process.requires_data_protection() {
        event.data_protection_confirmation = false;
    }
    if !event.application_process.uses_application_link() {
        event.application_link = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ApplicationProcess;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn event(organizer_id: Uuid) -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::new_v4(),
            organizer_id,
            name: "Event".into(),
            description: None,
            website: None,
            city: None,
            country: None,
            number_of_tickets: Some(10),
            start_date: today() + Duration::days(14),
            end_date: today() + Duration::days(15),
            deadline: today() + Duration::days(5),
            application_process: ApplicationProcess::SelectionByTravis,
            application_link: None,
            data_protection_confirmation: false,
            approved: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_listing_requires_approval_and_unfinished_event() {
        let mut e = event(Uuid::new_v4());
        assert!(!is_listed(&e, today()));

        e.approved = true;
        assert!(is_listed(&e, today()));

        e.end_date = today();
        assert!(is_listed(&e, today()), "events ending today are still listed");

        e.end_date = today() - Duration::days(1);
        assert!(!is_listed(&e, today()));
        assert!(is_past(&e, today()));

        e.approved = false;
        assert!(!is_past(&e, today()));
    }

    #[test]
    fn test_can_apply_uses_day_granularity() {
        let mut e = event(Uuid::new_v4());
        assert!(can_apply(&e, today()));

        e.deadline = today();
        assert!(can_apply(&e, today()));

        e.deadline = today() - Duration::days(1);
        assert!(!can_apply(&e, today()));
    }

    #[test]
    fn test_admin_can_always_edit() {
        let admin = User::new("Admin", "admin@example.com", true);
        let mut e = event(Uuid::new_v4());
        e.approved = true;
        e.deadline = today() - Duration::days(30);
        assert!(can_edit(&admin, &e, today()));
    }

    #[test]
    fn test_owner_edit_closes_on_approval_or_deadline() {
        let owner = User::new("Klaus", "klaus@example.com", false);
        let mut e = event(owner.id);
        assert!(can_edit(&owner, &e, today()));

        e.deadline = today();
        assert!(can_edit(&owner, &e, today()));

        e.approved = true;
        assert!(!can_edit(&owner, &e, today()));

        e.approved = false;
        e.deadline = today() - Duration::days(1);
        assert!(!can_edit(&owner, &e, today()));
    }

    #[test]
    fn test_non_owner_member_cannot_edit() {
        let stranger = User::new("Other", "different_address@example.org", false);
        let e = event(Uuid::new_v4());
        assert!(!can_edit(&stranger, &e, today()));
    }

    #[test]
    fn test_member_cannot_write_approval() {
        let mut changes = EventChanges {
            name: Some("MonstersConf".into()),
            approved: Some(true),
            ..Default::default()
        };
        let dropped = permit(&mut changes, Role::Member);
        assert_eq!(dropped, vec![EventField::Approved]);
        assert_eq!(changes.approved, None);
        assert_eq!(changes.name.as_deref(), Some("MonstersConf"));
    }

    #[test]
    fn test_admin_may_approve_but_not_revoke() {
        let mut approve = EventChanges {
            approved: Some(true),
            ..Default::default()
        };
        assert!(permit(&mut approve, Role::Admin).is_empty());
        assert_eq!(approve.approved, Some(true));

        let mut revoke = EventChanges {
            approved: Some(false),
            ..Default::default()
        };
        assert_eq!(permit(&mut revoke, Role::Admin), vec![EventField::Approved]);
        assert_eq!(revoke.approved, None);
    }

    #[test]
    fn test_normalize_discards_foreign_application_data() {
        let mut e = event(Uuid::new_v4());
        e.data_protection_confirmation = true;
        e.application_link = Some("somelink.tada".into());
        normalize_application(&mut e);
        assert!(!e.data_protection_confirmation);
        assert_eq!(e.application_link, None);

        let mut by_organizer = event(Uuid::new_v4());
        by_organizer.application_process = ApplicationProcess::SelectionByOrganizer;
        by_organizer.data_protection_confirmation = true;
        normalize_application(&mut by_organizer);
        assert!(by_organizer.data_protection_confirmation);
    }

    #[test]
    fn test_role_of_user() {
        assert_eq!(Role::of(&User::new("a", "a@example.com", true)), Role::Admin);
        assert_eq!(Role::of(&User::new("b", "b@example.com", false)), Role::Member);
    }
}
