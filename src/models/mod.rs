pub mod event;
pub mod user;

pub use event::{ApplicationProcess, Event, EventChanges, EventField, EventForm};
pub use user::User;
