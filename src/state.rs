use std::sync::Arc;

use crate::config::Config;
use crate::engine::{Clock, EventEngine};
use crate::store::UserStore;

/// Shared state handed to every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub engine: Arc<EventEngine>,
    pub users: Arc<dyn UserStore>,
    pub clock: Arc<dyn Clock>,
}
