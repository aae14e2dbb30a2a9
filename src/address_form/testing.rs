//! In-memory backend for form and page tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use dashmap::DashMap;

use super::traits::{GeoDirectory, ProfileService};
use crate::error::Error;
use crate::types::{
    AddressUpdate, City, Country, CountryId, ExistingAddress, Profile, ProfileId, State, StateId,
};

#[derive(Default)]
pub(crate) struct FakeBackend {
    pub(crate) countries: Vec<Country>,
    pub(crate) states: HashMap<String, Vec<State>>,
    pub(crate) cities: HashMap<String, Vec<City>>,
    pub(crate) delays: HashMap<String, Duration>,
    pub(crate) address: Mutex<Option<ExistingAddress>>,
    pub(crate) fail_updates: AtomicBool,
    pub(crate) fail_profile: AtomicBool,
    pub(crate) calls: DashMap<&'static str, usize>,
    pub(crate) updates: Mutex<Vec<AddressUpdate>>,
    pub(crate) profile_reads: AtomicUsize,
}

impl FakeBackend {
    pub(crate) fn geo() -> Self {
        Self {
            countries: vec![Country::new("C1", "One"), Country::new("C2", "Two")],
            states: HashMap::from([
                ("C1".into(), vec![State::new("S1", "First")]),
                ("C2".into(), vec![State::new("S2", "Second")]),
            ]),
            cities: HashMap::from([
                ("S1".into(), vec![City::new("Y1", "CityY")]),
                ("S2".into(), vec![City::new("Y2", "CityZ")]),
            ]),
            ..Self::default()
        }
    }

    pub(crate) fn with_delay(mut self, key: &str, delay: Duration) -> Self {
        self.delays.insert(key.into(), delay);
        self
    }

    pub(crate) fn with_address(self, address: ExistingAddress) -> Self {
        self.set_address(Some(address));
        self
    }

    /// Change what the next profile read returns.
    pub(crate) fn set_address(&self, address: Option<ExistingAddress>) {
        *self.address.lock().unwrap() = address;
    }

    pub(crate) fn calls(&self, op: &'static str) -> usize {
        self.calls.get(op).map(|c| *c).unwrap_or(0)
    }

    pub(crate) fn updates(&self) -> Vec<AddressUpdate> {
        self.updates.lock().unwrap().clone()
    }

    fn record(&self, op: &'static str) {
        *self.calls.entry(op).or_insert(0) += 1;
    }

    async fn pause(&self, key: &str) {
        if let Some(delay) = self.delays.get(key) {
            tokio::time::sleep(*delay).await;
        }
    }

    fn profile(&self) -> Profile {
        Profile {
            id: ProfileId::from("p1"),
            username: "ana".into(),
            first_name: "Ana".into(),
            last_name: "Lima".into(),
            dob: None,
            contact_number: None,
            address: self.address.lock().unwrap().clone(),
        }
    }
}

fn unavailable(operation: &'static str) -> Error {
    Error::Api {
        operation,
        status: Some(503),
        detail: "unavailable".into(),
    }
}

impl GeoDirectory for FakeBackend {
    async fn countries(&self) -> Result<Vec<Country>, Error> {
        self.record("countries");
        Ok(self.countries.clone())
    }

    async fn states(&self, country: &CountryId) -> Result<Vec<State>, Error> {
        self.record("states");
        self.pause(country.as_str()).await;
        Ok(self.states.get(country.as_str()).cloned().unwrap_or_default())
    }

    async fn cities(&self, state: &StateId) -> Result<Vec<City>, Error> {
        self.record("cities");
        self.pause(state.as_str()).await;
        Ok(self.cities.get(state.as_str()).cloned().unwrap_or_default())
    }
}

impl ProfileService for FakeBackend {
    async fn current_profile(&self) -> Result<Profile, Error> {
        self.profile_reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_profile.load(Ordering::SeqCst) {
            return Err(unavailable("profile lookup"));
        }
        Ok(self.profile())
    }

    async fn update_address(&self, update: &AddressUpdate) -> Result<Profile, Error> {
        self.record("update_address");
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(unavailable("address update"));
        }
        self.updates.lock().unwrap().push(update.clone());
        Ok(self.profile())
    }
}
