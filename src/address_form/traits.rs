use std::future::Future;

use crate::error::Error;
use crate::types::{AddressUpdate, City, Country, CountryId, Profile, State, StateId};

/// Source of the three picker option lists.
///
/// Implementations normalize whatever envelope the backend uses into a plain
/// ordered list.
///
/// # Example
///
/// ```rust,ignore
/// impl GeoDirectory for StaticGeo {
///     async fn countries(&self) -> Result<Vec<Country>, Error> {
///         Ok(self.countries.clone())
///     }
///     // ...
/// }
/// ```
pub trait GeoDirectory: Send + Sync + 'static {
    /// All countries.
    fn countries(&self) -> impl Future<Output = Result<Vec<Country>, Error>> + Send;

    /// States belonging to `country`.
    fn states(
        &self,
        country: &CountryId,
    ) -> impl Future<Output = Result<Vec<State>, Error>> + Send;

    /// Cities belonging to `state`.
    fn cities(&self, state: &StateId) -> impl Future<Output = Result<Vec<City>, Error>> + Send;
}

/// The signed-in user's profile.
pub trait ProfileService: Send + Sync + 'static {
    /// Fetch the current profile, including its address if one is attached.
    fn current_profile(&self) -> impl Future<Output = Result<Profile, Error>> + Send;

    /// Replace the profile's address. All-or-nothing.
    fn update_address(
        &self,
        update: &AddressUpdate,
    ) -> impl Future<Output = Result<Profile, Error>> + Send;
}
