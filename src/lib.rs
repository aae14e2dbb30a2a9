#![doc = include_str!("../README.md")]

pub mod address_form;
pub mod address_page;
#[cfg(feature = "api")]
pub mod api;
pub mod config;
pub mod error;
pub mod guard;
pub mod session;
pub mod types;

// Re-exports for convenient access
pub use address_form::{AddressForm, AddressFormController, FormError};
pub use address_form::{GeoDirectory, ProfileService};
pub use address_page::AddressPage;
#[cfg(feature = "api")]
pub use api::ApiClient;
pub use config::{ClientConfig, Endpoints};
pub use error::Error;
pub use guard::{Guarded, Redirect, SessionGuard};
pub use session::{CredentialStore, MemoryCredentialStore, Session, SessionContext};
pub use types::{
    AddressUpdate, City, CityId, Country, CountryId, Credentials, ExistingAddress, GeoOption,
    Profile, ProfileId, SignupRequest, State, StateId, TokenPair,
};
