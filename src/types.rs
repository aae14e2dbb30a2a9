use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Backend identifiers arrive either as strings (UUID primary keys) or as
/// bare integers, depending on the resource. Both normalize to text.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Display, From, Into)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into_string()))
            }
        }
    };
}

id_type!(
    /// Country primary key.
    CountryId
);
id_type!(
    /// State primary key. Only meaningful together with its country.
    StateId
);
id_type!(
    /// City primary key; the foreign key stored on an address.
    CityId
);
id_type!(
    /// User profile primary key.
    ProfileId
);

/// One entry of a picker: `{id, name}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoOption<I> {
    pub id: I,
    pub name: String,
}

impl<I> GeoOption<I> {
    #[must_use]
    pub fn new(id: impl Into<I>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

pub type Country = GeoOption<CountryId>;
pub type State = GeoOption<StateId>;
pub type City = GeoOption<CityId>;

/// Address already attached to a profile. Read-only input for edit mode.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ExistingAddress {
    #[serde(default)]
    pub primary_address: String,
    #[serde(default)]
    pub secondary_address: Option<String>,
    #[serde(default)]
    pub pincode: String,
    #[serde(default)]
    pub country_id: Option<CountryId>,
    #[serde(default)]
    pub state_id: Option<StateId>,
    #[serde(default, alias = "city")]
    pub city_id: Option<CityId>,
    #[serde(default)]
    pub city_name: Option<String>,
}

impl ExistingAddress {
    /// Create an address with its text fields; ids are attached with `with_location`.
    #[must_use]
    pub fn new(primary_address: impl Into<String>, pincode: impl Into<String>) -> Self {
        Self {
            primary_address: primary_address.into(),
            pincode: pincode.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_secondary_address(mut self, secondary: impl Into<String>) -> Self {
        self.secondary_address = Some(secondary.into());
        self
    }

    /// Attach the resolved country, state and city.
    #[must_use]
    pub fn with_location(
        mut self,
        country: impl Into<CountryId>,
        state: impl Into<StateId>,
        city: impl Into<CityId>,
    ) -> Self {
        self.country_id = Some(country.into());
        self.state_id = Some(state.into());
        self.city_id = Some(city.into());
        self
    }

    #[must_use]
    pub fn with_city_name(mut self, name: impl Into<String>) -> Self {
        self.city_name = Some(name.into());
        self
    }
}

/// The signed-in user's profile as returned by the profile endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Profile {
    pub id: ProfileId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub address: Option<ExistingAddress>,
}

/// Payload for the profile address update. Sent as `{"address": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressUpdate {
    pub primary_address: String,
    pub secondary_address: String,
    pub pincode: String,
    pub city: CityId,
}

/// Access and refresh credentials issued on login or signup.
#[derive(Clone, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"[REDACTED]")
            .field("refresh", &"[REDACTED]")
            .finish()
    }
}

/// Username/password pair for the login endpoint.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Account registration form.
#[derive(Clone, Serialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    pub contact_number: String,
}

impl SignupRequest {
    /// Login credentials matching this registration.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.username.clone(), self.password.clone())
    }
}

impl std::fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupRequest")
            .field("username", &self.username)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish_non_exhaustive()
    }
}
