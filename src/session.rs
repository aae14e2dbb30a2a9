use std::sync::Arc;

use dashmap::DashMap;
use secrecy::{ExposeSecret, SecretString};

use crate::types::TokenPair;

/// Storage key of the access credential.
pub const ACCESS_KEY: &str = "access";
/// Storage key of the refresh credential.
pub const REFRESH_KEY: &str = "refresh";

/// Persisted credential storage addressed by named keys.
///
/// Implement this over whatever the host offers (browser local storage,
/// a keyring, a file). [`MemoryCredentialStore`] keeps values for the life
/// of the process.
pub trait CredentialStore: Send + Sync + 'static {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str);

    /// Remove the value under `key`. Removing a missing key is a no-op.
    fn remove(&self, key: &str);
}

/// In-process credential store.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    values: DashMap<String, String>,
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).map(|v| v.value().clone())
    }

    fn set(&self, key: &str, value: &str) {
        self.values.insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        self.values.remove(key);
    }
}

/// Snapshot of the stored credentials.
///
/// Credentials are wrapped in [`SecretString`]; `Debug` output is redacted.
#[derive(Debug, Default)]
pub struct Session {
    access: Option<SecretString>,
    refresh: Option<SecretString>,
}

impl Session {
    /// A session with no credentials.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Build a session from raw credential values. Empty strings count as absent.
    #[must_use]
    pub fn from_parts(access: Option<String>, refresh: Option<String>) -> Self {
        Self {
            access: non_empty(access),
            refresh: non_empty(refresh),
        }
    }

    /// Whether an access credential is present. No expiry or signature
    /// checks are made: presence is the only signal.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.access.is_some()
    }

    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access.as_ref().map(|s| s.expose_secret())
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh.as_ref().map(|s| s.expose_secret())
    }
}

fn non_empty(value: Option<String>) -> Option<SecretString> {
    value.filter(|v| !v.is_empty()).map(SecretString::from)
}

/// Process-wide session state, passed explicitly to whoever needs it.
///
/// Cloning is cheap and every clone sees the same store.
#[derive(Clone)]
pub struct SessionContext {
    store: Arc<dyn CredentialStore>,
}

impl SessionContext {
    #[must_use]
    pub fn new<S: CredentialStore>(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Share an existing store.
    #[must_use]
    pub fn from_arc(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Read the stored credentials.
    #[must_use]
    pub fn current(&self) -> Session {
        Session::from_parts(self.store.get(ACCESS_KEY), self.store.get(REFRESH_KEY))
    }

    /// Persist credentials after a successful login or signup.
    pub fn establish(&self, tokens: &TokenPair) {
        self.store.set(ACCESS_KEY, &tokens.access);
        self.store.set(REFRESH_KEY, &tokens.refresh);
        tracing::info!("Session established");
    }

    /// Drop both credentials (logout).
    pub fn teardown(&self) {
        self.store.remove(ACCESS_KEY);
        self.store.remove(REFRESH_KEY);
        tracing::info!("Session cleared");
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("authenticated", &self.current().is_authenticated())
            .finish()
    }
}
