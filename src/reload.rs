use std::time::Duration;

use crate::models::{NavigationEvent, NavigationType};

/// Default splash hold after a full page reload.
pub const DEFAULT_SPLASH_DELAY: Duration = Duration::from_millis(3000);

/// NavigationTiming
///
/// Read access to the navigation-timing record of the current document load.
/// `None` means the facility is unavailable on this host.
pub trait NavigationTiming: Send + Sync {
    fn navigation_type(&self) -> Option<NavigationType>;
}

/// StaticTiming
///
/// A timing record fixed at construction, e.g. the entry type reported by the
/// page at startup or passed on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StaticTiming(Option<NavigationType>);

impl StaticTiming {
    pub fn new(entry: NavigationType) -> Self {
        Self(Some(entry))
    }

    pub fn unavailable() -> Self {
        Self(None)
    }
}

impl From<Option<NavigationType>> for StaticTiming {
    fn from(entry: Option<NavigationType>) -> Self {
        Self(entry)
    }
}

impl NavigationTiming for StaticTiming {
    fn navigation_type(&self) -> Option<NavigationType> {
        self.0
    }
}

/// is_page_reload
///
/// True only for a full-page reload. Any other entry, or a missing timing
/// facility, never holds the user behind a splash.
pub fn is_page_reload(timing: &dyn NavigationTiming) -> bool {
    matches!(timing.navigation_type(), Some(NavigationType::Reload))
}

impl NavigationEvent {
    /// The application-start event. The timing record is consulted here, once,
    /// and never again for later navigations.
    pub fn boot(path: impl Into<String>, timing: &dyn NavigationTiming) -> Self {
        Self {
            path: path.into(),
            is_reload: is_page_reload(timing),
        }
    }
}
