use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::address_form::{GeoDirectory, ProfileService};
use crate::config::ClientConfig;
use crate::error::Error;
use crate::session::SessionContext;
use crate::types::{
    AddressUpdate, City, Country, CountryId, Credentials, GeoOption, Profile, SignupRequest,
    State, StateId, TokenPair,
};

/// List responses come bare, paginated, or wrapped depending on the view.
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Bare(Vec<T>),
    Paginated { results: Vec<T> },
    Wrapped { data: Vec<T> },
}

impl<T> Listing<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(items)
            | Self::Paginated { results: items }
            | Self::Wrapped { data: items } => items,
        }
    }
}

/// Single records come bare or under `data`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Record<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Record<T> {
    fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}

#[derive(Deserialize)]
struct TokenEnvelope {
    tokens: TokenPair,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LoginBody {
    Flat(TokenPair),
    Nested { data: TokenEnvelope },
}

impl LoginBody {
    fn into_tokens(self) -> TokenPair {
        match self {
            Self::Flat(tokens) => tokens,
            Self::Nested { data } => data.tokens,
        }
    }
}

#[derive(serde::Serialize)]
struct AddressPatch<'a> {
    address: &'a AddressUpdate,
}

/// HTTP client for the backend.
///
/// When a [`SessionContext`] is attached, every request carries the current
/// access credential as a bearer token.
#[derive(Clone)]
pub struct ApiClient {
    config: ClientConfig,
    http: reqwest::Client,
    session: Option<SessionContext>,
}

impl ApiClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the underlying HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            config,
            session: None,
        })
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    /// Authenticate requests with the credentials stored in `session`.
    #[must_use]
    pub fn with_session(mut self, session: SessionContext) -> Self {
        self.session = Some(session);
        self
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Exchange username and password for a token pair.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on network failure, or
    /// [`Error::Api`] if the backend rejects the credentials.
    pub async fn login(&self, credentials: &Credentials) -> Result<TokenPair, Error> {
        let url = self.config.endpoint(&self.config.endpoints().login)?;
        let response = self.http.post(url).json(credentials).send().await?;
        let response = Self::ensure_success(response, "login").await?;
        let body: LoginBody = Self::decode(response).await?;
        tracing::info!(username = %credentials.username, "Login successful");
        Ok(body.into_tokens())
    }

    /// Register an account, then log in with the same credentials.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] if registration or the follow-up login fails.
    pub async fn signup(&self, request: &SignupRequest) -> Result<TokenPair, Error> {
        let url = self.config.endpoint(&self.config.endpoints().signup)?;
        let response = self.http.post(url).json(request).send().await?;
        Self::ensure_success(response, "signup").await?;
        tracing::info!(username = %request.username, "Account registered");
        self.login(&request.credentials()).await
    }

    /// Log in and store the resulting credentials in the attached session.
    ///
    /// # Errors
    ///
    /// Same as [`login`](Self::login), plus [`Error::Config`] if no session is attached.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<(), Error> {
        let session = self.attached_session()?;
        let tokens = self.login(credentials).await?;
        session.establish(&tokens);
        Ok(())
    }

    /// Register, log in, and store the resulting credentials in the attached session.
    ///
    /// # Errors
    ///
    /// Same as [`signup`](Self::signup), plus [`Error::Config`] if no session is attached.
    pub async fn sign_up(&self, request: &SignupRequest) -> Result<(), Error> {
        let session = self.attached_session()?;
        let tokens = self.signup(request).await?;
        session.establish(&tokens);
        Ok(())
    }

    fn attached_session(&self) -> Result<&SessionContext, Error> {
        self.session
            .as_ref()
            .ok_or_else(|| Error::Config("no session attached to client".into()))
    }

    async fn fetch_list<I>(
        &self,
        path: &str,
        filter: Option<(&str, &str)>,
        operation: &'static str,
    ) -> Result<Vec<GeoOption<I>>, Error>
    where
        I: DeserializeOwned,
    {
        let mut url = self.config.endpoint(path)?;
        if let Some((key, value)) = filter {
            url.query_pairs_mut().append_pair(key, value);
        }
        let response = self.get(url).send().await?;
        let response = Self::ensure_success(response, operation).await?;
        let listing: Listing<GeoOption<I>> = Self::decode(response).await?;
        Ok(listing.into_vec())
    }

    fn get(&self, url: Url) -> reqwest::RequestBuilder {
        self.authorize(self.http.get(url))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let session = self.session.as_ref().map(SessionContext::current);
        match session.as_ref().and_then(|s| s.access_token()) {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, Error> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(Into::into)
    }

    /// Checks HTTP response status; returns the response on success or an error with details.
    async fn ensure_success(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<reqwest::Response, Error> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(Error::Api {
            operation,
            status: Some(status),
            detail: body,
        })
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.base_url().as_str())
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl GeoDirectory for ApiClient {
    async fn countries(&self) -> Result<Vec<Country>, Error> {
        self.fetch_list(&self.config.endpoints().countries, None, "countries lookup")
            .await
    }

    async fn states(&self, country: &CountryId) -> Result<Vec<State>, Error> {
        self.fetch_list(
            &self.config.endpoints().states,
            Some(("country", country.as_str())),
            "states lookup",
        )
        .await
    }

    async fn cities(&self, state: &StateId) -> Result<Vec<City>, Error> {
        self.fetch_list(
            &self.config.endpoints().cities,
            Some(("state", state.as_str())),
            "cities lookup",
        )
        .await
    }
}

impl ProfileService for ApiClient {
    async fn current_profile(&self) -> Result<Profile, Error> {
        let url = self.config.endpoint(&self.config.endpoints().profile)?;
        let response = self.get(url).send().await?;
        let response = Self::ensure_success(response, "profile lookup").await?;
        let record: Record<Profile> = Self::decode(response).await?;
        Ok(record.into_inner())
    }

    async fn update_address(&self, update: &AddressUpdate) -> Result<Profile, Error> {
        let url = self.config.endpoint(&self.config.endpoints().profile)?;
        let response = self
            .authorize(self.http.patch(url))
            .json(&AddressPatch { address: update })
            .send()
            .await?;
        let response = Self::ensure_success(response, "address update").await?;
        let record: Record<Profile> = Self::decode(response).await?;
        Ok(record.into_inner())
    }
}
