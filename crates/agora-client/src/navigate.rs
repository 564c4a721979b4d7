//! Navigation boundary
//!
//! The client never touches a view layer directly. When a session cannot be
//! recovered it asks an injected [`Navigator`] to move the user to the login
//! boundary — hosts supply whatever that means for them, and tests supply a
//! recorder.

/// Capability to observe and change the current view location.
///
/// Implementations must reflect a `navigate_to` call in subsequent
/// `location()` reads; the client relies on that to avoid re-issuing a
/// redirect the user already followed.
pub trait Navigator: Send + Sync {
    /// Current location path, e.g. `/boards/42`.
    fn location(&self) -> String;

    /// Move the user to the given path.
    fn navigate_to(&self, path: &str);
}

/// Navigator that remembers where it last sent the user.
///
/// Suitable for headless hosts (CLI, jobs); view-layer hosts wire their own.
pub struct TrackingNavigator {
    location: std::sync::Mutex<String>,
}

impl TrackingNavigator {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            location: std::sync::Mutex::new(initial.into()),
        }
    }
}

impl Navigator for TrackingNavigator {
    fn location(&self) -> String {
        match self.location.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn navigate_to(&self, path: &str) {
        let mut guard = match self.location.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = path.to_owned();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracking_navigator_reports_last_destination() {
        let nav = TrackingNavigator::new("/boards");
        assert_eq!(nav.location(), "/boards");

        nav.navigate_to("/login");
        assert_eq!(nav.location(), "/login");

        nav.navigate_to("/boards/42");
        assert_eq!(nav.location(), "/boards/42");
    }
}
