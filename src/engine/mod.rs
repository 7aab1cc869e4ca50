pub mod clock;
pub mod error;
pub mod events;
pub mod policy;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{EngineError, EngineResult};
pub use events::{
    AfterUpdate, EventEngine, EventView, FormTemplate, ListedEvent, Listing, OwnedEvent, Preview,
    Profile, Submitted, Updated,
};
pub use policy::Role;
