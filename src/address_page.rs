//! Profile address screen: shows the saved address, or hosts the
//! [`AddressFormController`] while the user adds or edits one.

use std::sync::Arc;

use crate::address_form::{AddressFormController, FormError, GeoDirectory, ProfileService};
use crate::types::{ExistingAddress, Profile};

/// Which half of the screen is active.
#[derive(Debug)]
pub enum Mode<B> {
    Viewing,
    Editing(Box<AddressFormController<B>>),
}

/// Address screen around the cascading form.
#[derive(Debug)]
pub struct AddressPage<B> {
    backend: Arc<B>,
    profile: Option<Profile>,
    loaded: bool,
    mode: Mode<B>,
}

impl<B> AddressPage<B>
where
    B: GeoDirectory + ProfileService,
{
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self::from_arc(Arc::new(backend))
    }

    #[must_use]
    pub fn from_arc(backend: Arc<B>) -> Self {
        Self {
            backend,
            profile: None,
            loaded: false,
            mode: Mode::Viewing,
        }
    }

    /// Whether the first profile load has completed (successfully or not).
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    #[must_use]
    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// The saved address, if any.
    #[must_use]
    pub fn address(&self) -> Option<&ExistingAddress> {
        self.profile.as_ref().and_then(|p| p.address.as_ref())
    }

    #[must_use]
    pub fn mode(&self) -> &Mode<B> {
        &self.mode
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        matches!(self.mode, Mode::Editing(_))
    }

    /// The open form, while editing.
    pub fn form_mut(&mut self) -> Option<&mut AddressFormController<B>> {
        match &mut self.mode {
            Mode::Editing(form) => Some(form.as_mut()),
            Mode::Viewing => None,
        }
    }

    /// Fetch the current profile. A failure is logged and the page behaves
    /// as if no address were saved.
    ///
    /// While editing, an address that changed since the form was opened is
    /// restored into the form again.
    pub async fn load(&mut self) {
        match self.backend.current_profile().await {
            Ok(profile) => self.profile = Some(profile),
            Err(e) => {
                tracing::warn!(error = %e, "Profile load failed");
                self.profile = None;
            }
        }
        self.loaded = true;

        let address = self.address().cloned();
        if let Mode::Editing(form) = &mut self.mode {
            form.receive_address(address.as_ref()).await;
        }
    }

    /// Open the form, pre-filled from the saved address when there is one.
    pub async fn begin_edit(&mut self) {
        let mut form = AddressFormController::new(Arc::clone(&self.backend));
        form.mount();
        form.receive_address(self.address()).await;
        self.mode = Mode::Editing(Box::new(form));
    }

    /// Close the form, discarding the draft.
    pub fn cancel_edit(&mut self) {
        self.mode = Mode::Viewing;
    }

    /// Submit the open form. On success the page leaves edit mode and
    /// re-fetches the profile; on failure the form stays open as it was.
    ///
    /// Does nothing when not editing.
    ///
    /// # Errors
    ///
    /// Propagates the form's [`FormError`].
    pub async fn save(&mut self) -> Result<(), FormError> {
        let Some(form) = self.form_mut() else {
            return Ok(());
        };
        form.submit().await?;
        self.mode = Mode::Viewing;
        self.load().await;
        Ok(())
    }
}
