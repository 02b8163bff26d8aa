//! Application state for the web layer.

use std::sync::Arc;

use crate::app::App;
use crate::cache::CachedMvgClient;
use crate::notify::RecordingNotifier;

/// Shared application state.
pub struct AppState<A = CachedMvgClient> {
    /// The controller every handler drives
    pub app: Arc<App<A>>,

    /// Notifications not yet collected by a client
    pub notifications: RecordingNotifier,
}

impl<A> AppState<A> {
    pub fn new(app: App<A>, notifications: RecordingNotifier) -> Self {
        Self {
            app: Arc::new(app),
            notifications,
        }
    }
}

impl<A> Clone for AppState<A> {
    fn clone(&self) -> Self {
        Self {
            app: Arc::clone(&self.app),
            notifications: self.notifications.clone(),
        }
    }
}
