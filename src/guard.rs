use crate::config::{ClientConfig, DEFAULT_UNAUTHENTICATED_ROUTE};
use crate::session::{Session, SessionContext};

/// Navigation instruction produced instead of a protected view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// Target route.
    pub location: String,
    /// Replace the current history entry so back-navigation skips the
    /// guarded route.
    pub replace: bool,
}

impl Redirect {
    #[must_use]
    pub fn replace(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            replace: true,
        }
    }
}

/// Outcome of guarding a view.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Guarded<V> {
    Render(V),
    Redirect(Redirect),
}

impl<V> Guarded<V> {
    /// The view, if access was granted.
    pub fn into_view(self) -> Option<V> {
        match self {
            Self::Render(view) => Some(view),
            Self::Redirect(_) => None,
        }
    }
}

/// Gate for protected views.
///
/// A pure presence test of the access credential, evaluated once per call.
/// No network, no token validation, no loading state.
///
/// ```rust,ignore
/// match guard.guard(&session.current(), ProjectList::new()) {
///     Guarded::Render(view) => show(view),
///     Guarded::Redirect(redirect) => navigate(redirect),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SessionGuard {
    unauthenticated_route: String,
}

impl Default for SessionGuard {
    fn default() -> Self {
        Self::new(DEFAULT_UNAUTHENTICATED_ROUTE)
    }
}

impl SessionGuard {
    #[must_use]
    pub fn new(unauthenticated_route: impl Into<String>) -> Self {
        Self {
            unauthenticated_route: unauthenticated_route.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.unauthenticated_route())
    }

    #[must_use]
    pub fn unauthenticated_route(&self) -> &str {
        &self.unauthenticated_route
    }

    /// `None` when the session may proceed, otherwise where to send it.
    #[must_use]
    pub fn check(&self, session: &Session) -> Option<Redirect> {
        if session.is_authenticated() {
            None
        } else {
            tracing::debug!(to = %self.unauthenticated_route, "No access credential, redirecting");
            Some(Redirect::replace(self.unauthenticated_route.clone()))
        }
    }

    /// Return `view` unchanged when authenticated; otherwise drop it and
    /// return a redirect.
    pub fn guard<V>(&self, session: &Session, view: V) -> Guarded<V> {
        match self.check(session) {
            None => Guarded::Render(view),
            Some(redirect) => Guarded::Redirect(redirect),
        }
    }

    /// Clear the session and send the user to the unauthenticated route.
    #[must_use]
    pub fn logout(&self, session: &SessionContext) -> Redirect {
        session.teardown();
        Redirect::replace(self.unauthenticated_route.clone())
    }
}
