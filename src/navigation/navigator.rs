use crate::navigation::Route;
use std::sync::{PoisonError, RwLock};
use tracing::info;

/// Capability to move the console to another route.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &Route);
}

/// Records every navigation in order. The last entry is the current location.
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    visited: RwLock<Vec<Route>>,
}

impl HistoryNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> Option<Route> {
        self.visited
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    #[must_use]
    pub fn history(&self) -> Vec<Route> {
        self.visited
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&self, route: &Route) {
        info!("navigate to {route}");
        self.visited
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route.clone());
    }
}
