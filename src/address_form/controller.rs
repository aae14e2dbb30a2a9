use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};

use super::error::FormError;
use super::state::{AddressForm, Completion, FetchRequest, Field};
use super::traits::{GeoDirectory, ProfileService};
use crate::types::{CityId, CountryId, ExistingAddress, Profile, StateId};

type OnSuccess = Box<dyn FnMut() + Send>;

/// Async driver for [`AddressForm`].
///
/// Fetches run concurrently on the calling task; results are applied in
/// arrival order and stale ones are dropped by the form.
pub struct AddressFormController<B> {
    form: AddressForm,
    backend: Arc<B>,
    pending: FuturesUnordered<BoxFuture<'static, Completion>>,
    on_success: Option<OnSuccess>,
    restored: Option<ExistingAddress>,
}

impl<B> AddressFormController<B>
where
    B: GeoDirectory + ProfileService,
{
    #[must_use]
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            form: AddressForm::new(),
            backend,
            pending: FuturesUnordered::new(),
            on_success: None,
            restored: None,
        }
    }

    /// Called once per successful submission, e.g. to leave edit mode.
    #[must_use]
    pub fn with_on_success(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn form(&self) -> &AddressForm {
        &self.form
    }

    /// Number of fetches issued but not yet applied.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Start loading the country list (first call only).
    pub fn mount(&mut self) {
        if let Some(request) = self.form.mount() {
            self.dispatch(request);
        }
    }

    /// Restore `existing` into the form.
    ///
    /// The form stays in `Prefilling` across one yield to the runtime so that
    /// everything scheduled alongside the restoration observes it, then
    /// returns to `Idle`. No states or cities fetch is issued.
    pub async fn prefill(&mut self, existing: &ExistingAddress) {
        self.form.begin_prefill(existing);
        self.restored = Some(existing.clone());
        tokio::task::yield_now().await;
        self.form.finish_prefill();
    }

    /// Feed the saved address in, e.g. after every profile load.
    ///
    /// Prefills again whenever `existing` differs from the address last
    /// restored. `None` and an unchanged address leave the form as it is.
    pub async fn receive_address(&mut self, existing: Option<&ExistingAddress>) {
        let Some(existing) = existing else {
            return;
        };
        if self.restored.as_ref() == Some(existing) {
            return;
        }
        self.prefill(existing).await;
    }

    pub fn select_country(&mut self, country: Option<CountryId>) {
        if let Some(request) = self.form.select_country(country) {
            self.dispatch(request);
        }
    }

    pub fn select_state(&mut self, state: Option<StateId>) {
        if let Some(request) = self.form.select_state(state) {
            self.dispatch(request);
        }
    }

    pub fn select_city(&mut self, city: Option<CityId>) {
        self.form.select_city(city);
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        self.form.set_field(field, value);
    }

    /// Wait for the next fetch to finish and apply it.
    ///
    /// Returns `None` when nothing is pending, otherwise whether the result
    /// was accepted.
    pub async fn next_completion(&mut self) -> Option<bool> {
        let completion = self.pending.next().await?;
        Some(self.form.apply(completion))
    }

    /// Drain all pending fetches.
    pub async fn settle(&mut self) {
        while self.next_completion().await.is_some() {}
    }

    /// Validate and send the address update.
    ///
    /// Validation failures never reach the backend. A backend failure leaves
    /// the draft and selection untouched so the user can retry.
    ///
    /// # Errors
    ///
    /// [`FormError::CityRequired`] / [`FormError::Invalid`] for local
    /// validation, [`FormError::Submit`] if the backend call fails.
    pub async fn submit(&mut self) -> Result<Profile, FormError> {
        let update = self.form.prepare_submit()?;

        match self.backend.update_address(&update).await {
            Ok(profile) => {
                tracing::info!(city = %update.city, "Address saved");
                self.form.record_saved();
                if let Some(callback) = self.on_success.as_mut() {
                    callback();
                }
                Ok(profile)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Address update failed");
                self.form.record_failed();
                Err(FormError::Submit(e))
            }
        }
    }

    fn dispatch(&mut self, request: FetchRequest) {
        let backend = Arc::clone(&self.backend);
        let fut = match request {
            FetchRequest::Countries { ticket } => async move {
                let result = backend.countries().await;
                Completion::Countries { ticket, result }
            }
            .boxed(),
            FetchRequest::States { ticket, country } => async move {
                let result = backend.states(&country).await;
                Completion::States {
                    ticket,
                    country,
                    result,
                }
            }
            .boxed(),
            FetchRequest::Cities { ticket, state } => async move {
                let result = backend.cities(&state).await;
                Completion::Cities {
                    ticket,
                    state,
                    result,
                }
            }
            .boxed(),
        };
        self.pending.push(fut);
    }
}

impl<B> std::fmt::Debug for AddressFormController<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressFormController")
            .field("form", &self.form)
            .field("pending", &self.pending.len())
            .field("restored", &self.restored.is_some())
            .finish_non_exhaustive()
    }
}
