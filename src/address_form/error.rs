use crate::error::Error;

/// Why a form submission did not go through.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// No city selected. Raised before any network call.
    #[error("Please select a city")]
    CityRequired,

    /// A required text field is empty. Raised before any network call.
    #[error("Invalid address: {0}")]
    Invalid(#[from] validator::ValidationErrors),

    /// The backend rejected the update or could not be reached.
    #[error("Failed to save address: {0}")]
    Submit(#[source] Error),
}

impl FormError {
    /// Whether the error was raised locally without contacting the backend.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::CityRequired | Self::Invalid(_))
    }
}
