//! Cascading Country → State → City address form.
//!
//! Split in two layers:
//!
//! - [`AddressForm`] is a sans-io state machine. Selection changes return the
//!   fetch they require as a [`FetchRequest`]; results come back as a
//!   [`Completion`] and are applied only if their [`Ticket`] is still current.
//! - [`AddressFormController`] drives that machine against a backend
//!   implementing [`GeoDirectory`] and [`ProfileService`], running fetches
//!   concurrently on the current task.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut form = AddressFormController::new(Arc::new(api))
//!     .with_on_success(|| tracing::info!("address saved"));
//! form.mount();
//! form.receive_address(profile.address.as_ref()).await;
//! form.settle().await;
//!
//! form.select_country(Some("C2".into()));
//! form.settle().await;
//! ```

mod controller;
mod error;
mod state;
#[cfg(test)]
pub(crate) mod testing;
mod traits;

pub use controller::AddressFormController;
pub use error::FormError;
pub use state::{
    AddressDraft, AddressForm, Completion, FetchRequest, Field, GeoOptions, GeoSelection, Notice,
    Phase, Region, Ticket,
};
pub use traits::{GeoDirectory, ProfileService};
