use validator::Validate;

use super::error::FormError;
use crate::error::Error;
use crate::types::{
    AddressUpdate, City, CityId, Country, CountryId, ExistingAddress, GeoOption, State, StateId,
};

const CITY_REQUIRED: &str = "Please select a city";
const SAVED: &str = "Address saved successfully";
const SAVE_FAILED: &str = "Failed to save address";

/// Whether selection writes currently drive the fetch/reset cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// Restoring an existing address. Cascade regions take no action.
    Prefilling,
}

/// The three independently fetched option lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Countries,
    States,
    Cities,
}

/// Identifies one issued fetch. Only the latest ticket per region is honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    region: Region,
    generation: u64,
}

impl Ticket {
    #[must_use]
    pub fn region(&self) -> Region {
        self.region
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A fetch the form needs performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Countries { ticket: Ticket },
    States { ticket: Ticket, country: CountryId },
    Cities { ticket: Ticket, state: StateId },
}

impl FetchRequest {
    #[must_use]
    pub fn ticket(&self) -> Ticket {
        match self {
            Self::Countries { ticket }
            | Self::States { ticket, .. }
            | Self::Cities { ticket, .. } => *ticket,
        }
    }
}

/// Result of a [`FetchRequest`], handed back to [`AddressForm::apply`].
#[derive(Debug)]
pub enum Completion {
    Countries {
        ticket: Ticket,
        result: Result<Vec<Country>, Error>,
    },
    States {
        ticket: Ticket,
        country: CountryId,
        result: Result<Vec<State>, Error>,
    },
    Cities {
        ticket: Ticket,
        state: StateId,
        result: Result<Vec<City>, Error>,
    },
}

/// Current picker selection. Each level is only meaningful when its parent is set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeoSelection {
    pub country: Option<CountryId>,
    pub state: Option<StateId>,
    pub city: Option<CityId>,
}

/// Option lists backing the three pickers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeoOptions {
    pub countries: Vec<Country>,
    pub states: Vec<State>,
    pub cities: Vec<City>,
}

/// Editable free-text part of the address.
#[derive(Debug, Clone, PartialEq, Eq, Default, Validate)]
pub struct AddressDraft {
    #[validate(length(min = 1, message = "Primary address is required"))]
    pub primary_address: String,
    pub secondary_address: String,
    #[validate(length(min = 1, message = "Pincode is required"))]
    pub pincode: String,
}

impl From<&ExistingAddress> for AddressDraft {
    fn from(existing: &ExistingAddress) -> Self {
        Self {
            primary_address: existing.primary_address.clone(),
            secondary_address: existing.secondary_address.clone().unwrap_or_default(),
            pincode: existing.pincode.clone(),
        }
    }
}

/// Free-text fields of the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    PrimaryAddress,
    SecondaryAddress,
    Pincode,
}

/// User-facing acknowledgment of the last submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Saved,
    SaveFailed,
    Invalid(String),
}

impl Notice {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Saved => SAVED,
            Self::SaveFailed => SAVE_FAILED,
            Self::Invalid(msg) => msg,
        }
    }
}

#[derive(Debug, Default)]
struct Generations {
    countries: u64,
    states: u64,
    cities: u64,
}

impl Generations {
    fn next(&mut self, region: Region) -> Ticket {
        let counter = match region {
            Region::Countries => &mut self.countries,
            Region::States => &mut self.states,
            Region::Cities => &mut self.cities,
        };
        *counter += 1;
        Ticket {
            region,
            generation: *counter,
        }
    }

    fn invalidate(&mut self, region: Region) {
        self.next(region);
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        let current = match ticket.region {
            Region::Countries => self.countries,
            Region::States => self.states,
            Region::Cities => self.cities,
        };
        current == ticket.generation
    }
}

/// Sans-io cascading address form.
///
/// Every user-driven selection change returns the fetch it requires, if any.
/// The caller performs it and hands the result back through [`apply`](Self::apply).
#[derive(Debug, Default)]
pub struct AddressForm {
    phase: Phase,
    draft: AddressDraft,
    selection: GeoSelection,
    options: GeoOptions,
    countries_requested: bool,
    generations: Generations,
    notice: Option<Notice>,
}

impl AddressForm {
    /// A blank form (create mode).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn is_prefilling(&self) -> bool {
        self.phase == Phase::Prefilling
    }

    #[must_use]
    pub fn draft(&self) -> &AddressDraft {
        &self.draft
    }

    #[must_use]
    pub fn selection(&self) -> &GeoSelection {
        &self.selection
    }

    #[must_use]
    pub fn options(&self) -> &GeoOptions {
        &self.options
    }

    #[must_use]
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    #[must_use]
    pub fn state_picker_enabled(&self) -> bool {
        self.selection.country.is_some()
    }

    #[must_use]
    pub fn city_picker_enabled(&self) -> bool {
        self.selection.state.is_some()
    }

    /// Request the country list. Returns `Some` only the first time.
    pub fn mount(&mut self) -> Option<FetchRequest> {
        if self.countries_requested {
            return None;
        }
        self.countries_requested = true;
        Some(FetchRequest::Countries {
            ticket: self.generations.next(Region::Countries),
        })
    }

    /// Enter `Prefilling` and restore `existing` into the draft and selection.
    ///
    /// Selection writes bypass the cascade. Any states or cities fetch still
    /// in flight is invalidated so it cannot overwrite the restored values.
    pub fn begin_prefill(&mut self, existing: &ExistingAddress) {
        self.phase = Phase::Prefilling;
        self.generations.invalidate(Region::States);
        self.generations.invalidate(Region::Cities);

        self.draft = AddressDraft::from(existing);
        self.selection = GeoSelection {
            country: existing.country_id.clone(),
            state: existing.state_id.clone(),
            city: existing.city_id.clone(),
        };
        if let (Some(id), Some(name)) = (&existing.city_id, &existing.city_name) {
            self.options.cities = vec![GeoOption::new(id.clone(), name.clone())];
        }
        self.notice = None;

        tracing::debug!(
            country = ?self.selection.country,
            state = ?self.selection.state,
            city = ?self.selection.city,
            "Prefilling address form"
        );
    }

    /// Return to `Idle`. Does not run the cascade for the restored selection.
    pub fn finish_prefill(&mut self) {
        self.phase = Phase::Idle;
    }

    /// Change the country.
    ///
    /// On an actual change while idle: clears state and city, empties the
    /// state and city lists, invalidates in-flight fetches for both, and
    /// requests the states of the new country (if one was chosen).
    pub fn select_country(&mut self, country: Option<CountryId>) -> Option<FetchRequest> {
        if self.selection.country == country {
            return None;
        }
        self.selection.country = country.clone();
        if self.is_prefilling() {
            return None;
        }

        self.selection.state = None;
        self.selection.city = None;
        self.options.states.clear();
        self.options.cities.clear();
        self.generations.invalidate(Region::Cities);
        let ticket = self.generations.next(Region::States);

        country.map(|country| FetchRequest::States { ticket, country })
    }

    /// Change the state. Ignored while no country is selected.
    ///
    /// On an actual change while idle: clears the city and the city list and
    /// requests the cities of the new state (if one was chosen).
    pub fn select_state(&mut self, state: Option<StateId>) -> Option<FetchRequest> {
        if self.selection.country.is_none() {
            tracing::debug!("State selected without a country, ignoring");
            return None;
        }
        if self.selection.state == state {
            return None;
        }
        self.selection.state = state.clone();
        if self.is_prefilling() {
            return None;
        }

        self.selection.city = None;
        self.options.cities.clear();
        let ticket = self.generations.next(Region::Cities);

        state.map(|state| FetchRequest::Cities { ticket, state })
    }

    /// Change the city. Ignored while no state is selected.
    pub fn select_city(&mut self, city: Option<CityId>) {
        if self.selection.state.is_none() {
            tracing::debug!("City selected without a state, ignoring");
            return;
        }
        self.selection.city = city;
    }

    /// Edit a free-text field. Never touches the cascade.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::PrimaryAddress => self.draft.primary_address = value,
            Field::SecondaryAddress => self.draft.secondary_address = value,
            Field::Pincode => self.draft.pincode = value,
        }
    }

    /// Apply a fetch result. Returns `false` if it was stale and discarded.
    ///
    /// A result is stale when a newer fetch was issued for its region since,
    /// or its governing selection no longer matches. Failures empty the list.
    pub fn apply(&mut self, completion: Completion) -> bool {
        match completion {
            Completion::Countries { ticket, result } => {
                if !self.generations.is_current(ticket) {
                    tracing::debug!(generation = ticket.generation, "Discarding stale countries");
                    return false;
                }
                self.options.countries = unwrap_or_log(result, "countries");
                true
            }
            Completion::States {
                ticket,
                country,
                result,
            } => {
                if !self.generations.is_current(ticket)
                    || self.selection.country.as_ref() != Some(&country)
                {
                    tracing::debug!(country = %country, "Discarding stale states");
                    return false;
                }
                self.options.states = unwrap_or_log(result, "states");
                true
            }
            Completion::Cities {
                ticket,
                state,
                result,
            } => {
                if !self.generations.is_current(ticket)
                    || self.selection.state.as_ref() != Some(&state)
                {
                    tracing::debug!(state = %state, "Discarding stale cities");
                    return false;
                }
                self.options.cities = unwrap_or_log(result, "cities");
                true
            }
        }
    }

    /// Validate locally and build the update payload.
    ///
    /// # Errors
    ///
    /// [`FormError::CityRequired`] if no city is selected, checked first;
    /// [`FormError::Invalid`] if a required text field is empty.
    pub fn prepare_submit(&mut self) -> Result<AddressUpdate, FormError> {
        let Some(city) = self.selection.city.clone() else {
            self.notice = Some(Notice::Invalid(CITY_REQUIRED.into()));
            return Err(FormError::CityRequired);
        };
        if let Err(errors) = self.draft.validate() {
            self.notice = Some(Notice::Invalid(first_message(&errors)));
            return Err(errors.into());
        }
        Ok(AddressUpdate {
            primary_address: self.draft.primary_address.clone(),
            secondary_address: self.draft.secondary_address.clone(),
            pincode: self.draft.pincode.clone(),
            city,
        })
    }

    pub fn record_saved(&mut self) {
        self.notice = Some(Notice::Saved);
    }

    /// Mark the submission as failed. Draft and selection are left intact.
    pub fn record_failed(&mut self) {
        self.notice = Some(Notice::SaveFailed);
    }
}

fn unwrap_or_log<T>(result: Result<Vec<T>, Error>, what: &'static str) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, list = what, "Option list fetch failed");
        Vec::new()
    })
}

fn first_message(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(ToString::to_string))
        .unwrap_or_else(|| "Data validation failed.".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn existing() -> ExistingAddress {
        ExistingAddress::new("A", "12345")
            .with_secondary_address("")
            .with_location("C1", "S1", "Y1")
            .with_city_name("CityY")
    }

    fn prefilled() -> AddressForm {
        let mut form = AddressForm::new();
        form.begin_prefill(&existing());
        form.finish_prefill();
        form
    }

    fn states_ticket(request: Option<FetchRequest>) -> (Ticket, CountryId) {
        match request {
            Some(FetchRequest::States { ticket, country }) => (ticket, country),
            other => panic!("expected states request, got {other:?}"),
        }
    }

    #[test]
    fn mount_requests_countries_once() {
        let mut form = AddressForm::new();
        assert!(matches!(form.mount(), Some(FetchRequest::Countries { .. })));
        assert_eq!(form.mount(), None);
    }

    #[test]
    fn countries_failure_leaves_list_empty() {
        let mut form = AddressForm::new();
        let ticket = form.mount().unwrap().ticket();
        let applied = form.apply(Completion::Countries {
            ticket,
            result: Err(Error::Config("boom".into())),
        });
        assert!(applied);
        assert!(form.options().countries.is_empty());
    }

    #[test]
    fn prefill_restores_without_fetching() {
        let mut form = AddressForm::new();
        form.begin_prefill(&existing());

        assert!(form.is_prefilling());
        // cascade writes while prefilling are inert
        assert_eq!(form.select_country(Some("C9".into())), None);
        assert_eq!(form.selection().state, Some(StateId::from("S1")));
        assert_eq!(form.select_country(Some("C1".into())), None);

        form.finish_prefill();

        assert_eq!(form.phase(), Phase::Idle);
        assert_eq!(form.draft().primary_address, "A");
        assert_eq!(form.draft().secondary_address, "");
        assert_eq!(form.draft().pincode, "12345");
        assert_eq!(
            form.selection(),
            &GeoSelection {
                country: Some("C1".into()),
                state: Some("S1".into()),
                city: Some("Y1".into()),
            }
        );
        assert_eq!(form.options().cities, vec![City::new("Y1", "CityY")]);
    }

    #[test]
    fn country_change_after_prefill_resets_dependents() {
        let mut form = prefilled();

        let (_, country) = states_ticket(form.select_country(Some("C2".into())));

        assert_eq!(country, CountryId::from("C2"));
        assert_eq!(form.selection().state, None);
        assert_eq!(form.selection().city, None);
        assert!(form.options().cities.is_empty());
        assert!(form.options().states.is_empty());
    }

    #[test]
    fn reselecting_same_country_is_a_noop() {
        let mut form = prefilled();
        assert_eq!(form.select_country(Some("C1".into())), None);
        assert_eq!(form.selection().city, Some(CityId::from("Y1")));
    }

    #[test]
    fn clearing_country_clears_dependents_without_fetch() {
        let mut form = prefilled();
        assert_eq!(form.select_country(None), None);
        assert_eq!(form.selection(), &GeoSelection::default());
        assert!(!form.state_picker_enabled());
        assert!(!form.city_picker_enabled());
    }

    #[test]
    fn state_change_requests_cities_and_clears_city() {
        let mut form = prefilled();
        match form.select_state(Some("S2".into())) {
            Some(FetchRequest::Cities { state, .. }) => assert_eq!(state, StateId::from("S2")),
            other => panic!("expected cities request, got {other:?}"),
        }
        assert_eq!(form.selection().city, None);
        assert_eq!(form.selection().country, Some(CountryId::from("C1")));
    }

    #[test]
    fn dependent_pickers_follow_parent_selection() {
        let mut form = AddressForm::new();
        assert!(!form.state_picker_enabled());
        assert_eq!(form.select_state(Some("S1".into())), None);
        assert_eq!(form.selection().state, None);

        form.select_country(Some("C1".into()));
        assert!(form.state_picker_enabled());
        assert!(!form.city_picker_enabled());

        form.select_city(Some("Y1".into()));
        assert_eq!(form.selection().city, None);
    }

    #[test]
    fn superseded_states_response_is_discarded() {
        let mut form = AddressForm::new();
        let (t1, c1) = states_ticket(form.select_country(Some("C1".into())));
        let (t2, c2) = states_ticket(form.select_country(Some("C2".into())));

        assert!(form.apply(Completion::States {
            ticket: t2,
            country: c2,
            result: Ok(vec![State::new("S2a", "Second")]),
        }));
        assert!(!form.apply(Completion::States {
            ticket: t1,
            country: c1,
            result: Ok(vec![State::new("S1a", "First")]),
        }));

        assert_eq!(form.options().states, vec![State::new("S2a", "Second")]);
    }

    #[test]
    fn superseded_cities_response_is_discarded() {
        let mut form = AddressForm::new();
        form.select_country(Some("C1".into()));
        let Some(FetchRequest::Cities { ticket: t1, state: s1 }) =
            form.select_state(Some("S1".into()))
        else {
            panic!("expected cities request");
        };
        let Some(FetchRequest::Cities { ticket: t2, state: s2 }) =
            form.select_state(Some("S2".into()))
        else {
            panic!("expected cities request");
        };

        assert!(form.apply(Completion::Cities {
            ticket: t2,
            state: s2,
            result: Ok(vec![City::new("Y2", "CityZ")]),
        }));
        assert!(!form.apply(Completion::Cities {
            ticket: t1,
            state: s1,
            result: Ok(vec![City::new("Y1", "CityY")]),
        }));

        assert_eq!(form.options().cities, vec![City::new("Y2", "CityZ")]);
        assert_eq!(form.selection().state, Some(StateId::from("S2")));
    }

    #[test]
    fn cities_in_flight_are_dropped_on_country_change() {
        let mut form = prefilled();
        let Some(FetchRequest::Cities { ticket, state }) = form.select_state(Some("S2".into()))
        else {
            panic!("expected cities request");
        };
        form.select_country(Some("C3".into()));

        assert!(!form.apply(Completion::Cities {
            ticket,
            state,
            result: Ok(vec![City::new("Y9", "Late")]),
        }));
        assert!(form.options().cities.is_empty());
    }

    #[test]
    fn prefill_discards_in_flight_states() {
        let mut form = AddressForm::new();
        let (ticket, country) = states_ticket(form.select_country(Some("C1".into())));

        form.begin_prefill(&existing());
        form.finish_prefill();

        assert!(!form.apply(Completion::States {
            ticket,
            country,
            result: Ok(vec![State::new("S7", "Stale")]),
        }));
        assert_eq!(form.selection().state, Some(StateId::from("S1")));
    }

    #[test]
    fn failed_states_fetch_empties_list() {
        let mut form = AddressForm::new();
        let (ticket, country) = states_ticket(form.select_country(Some("C1".into())));
        assert!(form.apply(Completion::States {
            ticket,
            country,
            result: Err(Error::Api {
                operation: "states lookup",
                status: Some(500),
                detail: String::new(),
            }),
        }));
        assert!(form.options().states.is_empty());
        assert!(form.state_picker_enabled());
    }

    #[test]
    fn submit_without_city_is_rejected_locally() {
        let mut form = AddressForm::new();
        form.set_field(Field::PrimaryAddress, "A");
        form.set_field(Field::Pincode, "12345");

        let err = form.prepare_submit().unwrap_err();

        assert!(matches!(err, FormError::CityRequired));
        assert!(err.is_validation());
        assert_eq!(form.notice().map(Notice::message), Some("Please select a city"));
    }

    #[test]
    fn submit_requires_text_fields() {
        let mut form = prefilled();
        form.set_field(Field::Pincode, "");

        let err = form.prepare_submit().unwrap_err();

        assert!(matches!(err, FormError::Invalid(_)));
        assert_eq!(form.notice().map(Notice::message), Some("Pincode is required"));
    }

    #[test]
    fn submit_payload_carries_draft_and_city() {
        let mut form = prefilled();
        form.set_field(Field::SecondaryAddress, "Flat 2");

        let update = form.prepare_submit().unwrap();

        assert_eq!(
            update,
            AddressUpdate {
                primary_address: "A".into(),
                secondary_address: "Flat 2".into(),
                pincode: "12345".into(),
                city: "Y1".into(),
            }
        );
    }

    #[test]
    fn failed_submit_keeps_draft() {
        let mut form = prefilled();
        form.set_field(Field::PrimaryAddress, "B");
        form.record_failed();

        assert_eq!(form.notice(), Some(&Notice::SaveFailed));
        assert_eq!(form.draft().primary_address, "B");
        assert_eq!(form.selection().city, Some(CityId::from("Y1")));
    }
}
