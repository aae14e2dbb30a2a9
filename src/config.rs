use std::time::Duration;

use url::Url;

use crate::error::Error;

/// Route unauthenticated users are sent to.
pub const DEFAULT_UNAUTHENTICATED_ROUTE: &str = "/signup";

/// Backend endpoint paths, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Endpoints {
    pub countries: String,
    pub states: String,
    pub cities: String,
    pub profile: String,
    pub login: String,
    pub signup: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            countries: "misc/countries/".into(),
            states: "misc/states/".into(),
            cities: "misc/cities/".into(),
            profile: "users/profile/me/".into(),
            login: "users/login/".into(),
            signup: "users/signup/".into(),
        }
    }
}

/// Client configuration.
///
/// The base URL is a constructor parameter; everything else has a default
/// and can be overridden by chaining:
///
/// ```rust,ignore
/// let config = ClientConfig::new("http://localhost:8000".parse()?)
///     .with_unauthenticated_route("/login")
///     .with_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ClientConfig {
    pub(crate) base_url: Url,
    pub(crate) endpoints: Endpoints,
    pub(crate) unauthenticated_route: String,
    pub(crate) timeout: Option<Duration>,
}

impl ClientConfig {
    /// Create a configuration for the backend at `base_url`.
    ///
    /// A trailing slash is added to the path if missing so relative
    /// endpoint paths join under it instead of replacing its last segment.
    #[must_use]
    pub fn new(mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            base_url,
            endpoints: Endpoints::default(),
            unauthenticated_route: DEFAULT_UNAUTHENTICATED_ROUTE.into(),
            timeout: None,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Required env vars
    /// - `PMS_API_URL`: backend base URL
    ///
    /// # Optional env vars
    /// - `PMS_UNAUTHENTICATED_ROUTE`: redirect target for guarded views (default `/signup`)
    /// - `PMS_HTTP_TIMEOUT_SECS`: per-request timeout in whole seconds
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the base URL is missing or invalid, or the
    /// timeout is not a positive integer.
    pub fn from_env() -> Result<Self, Error> {
        let url_str = std::env::var("PMS_API_URL")
            .map_err(|_| Error::Config("PMS_API_URL is required".into()))?;
        let base_url: Url = url_str
            .parse()
            .map_err(|e| Error::Config(format!("PMS_API_URL: {e}")))?;

        let mut config = Self::new(base_url);

        if let Ok(route) = std::env::var("PMS_UNAUTHENTICATED_ROUTE") {
            config = config.with_unauthenticated_route(route);
        }
        if let Ok(secs) = std::env::var("PMS_HTTP_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| {
                    Error::Config(format!(
                        "PMS_HTTP_TIMEOUT_SECS must be a positive integer, got {secs:?}"
                    ))
                })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    #[must_use]
    pub fn with_unauthenticated_route(mut self, route: impl Into<String>) -> Self {
        self.unauthenticated_route = route.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    #[must_use]
    pub fn unauthenticated_route(&self) -> &str {
        &self.unauthenticated_route
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Resolve an endpoint path against the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the joined URL is invalid.
    pub fn endpoint(&self, path: &str) -> Result<Url, Error> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::Config(format!("endpoint {path}: {e}")))
    }
}
