use chrono_tz::Tz;

use crate::finder::EclipseFinder;

/// Shared, read-only after startup.
pub struct AppState {
    pub finder: EclipseFinder,
    /// Zone used for "today" when a request gives no date.
    pub tz: Tz,
}
