//! Provider editing session.
//!
//! Loads the catalogues, restores the provider's latest listing as a draft,
//! and saves the form back with the dropdown's current selection as its
//! category.

use log::{debug, info, warn};

use crate::catalogue::GroupSource;
use crate::dialog::SelectionDialog;
use crate::error::{CategoryError, SessionError, StoreError};
use crate::listing::ServiceListing;
use crate::store::ListingStore;

/// Form state for one signed-in provider.
#[derive(Debug)]
pub struct EditorSession {
    provider_id: String,
    dialog: SelectionDialog,
    draft: Option<ServiceListing>,
}

impl EditorSession {
    /// Start a session.
    ///
    /// Fails when no provider is signed in, when the catalogues cannot be
    /// loaded, or when there are none. A draft that cannot be fetched is
    /// logged and the form starts empty.
    pub fn load(
        source: &dyn GroupSource,
        store: &dyn ListingStore,
        provider_id: &str,
    ) -> Result<Self, SessionError> {
        let provider_id = provider_id.trim();
        if provider_id.is_empty() {
            return Err(StoreError::NotSignedIn.into());
        }

        let groups = source.load_groups()?;
        if groups.is_empty() {
            warn!("no catalogues available");
            return Err(CategoryError::EmptyGroupData.into());
        }
        debug!("loaded {} catalogues", groups.len());

        let mut dialog = SelectionDialog::new(groups);
        let draft = match store.latest(provider_id) {
            Ok(draft) => draft,
            Err(e) => {
                warn!("failed to load draft for {provider_id}: {e}");
                None
            }
        };

        if let Some(draft) = &draft {
            debug!("restoring draft category: {}", draft.category);
            dialog.restore_from_serialized(&draft.category);
        }

        Ok(Self {
            provider_id: provider_id.to_string(),
            dialog,
            draft,
        })
    }

    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    pub const fn dialog(&self) -> &SelectionDialog {
        &self.dialog
    }

    pub const fn dialog_mut(&mut self) -> &mut SelectionDialog {
        &mut self.dialog
    }

    /// The listing the form was pre-filled from, if any.
    pub const fn draft(&self) -> Option<&ServiceListing> {
        self.draft.as_ref()
    }

    /// Category string for the current selection.
    pub fn category(&self) -> String {
        self.dialog.selection().to_serialized()
    }

    /// A listing pre-filled from the draft, or an empty one.
    pub fn new_listing(&self) -> ServiceListing {
        let mut listing = self
            .draft
            .clone()
            .unwrap_or_else(|| ServiceListing::new(&self.provider_id));
        listing.category = self.category();
        listing
    }

    /// Validate and store the form.
    ///
    /// The listing takes this session's provider and selection. When a draft
    /// was loaded, it is overwritten rather than a new listing created.
    /// Fails while the dropdown is open, since its edits may still be
    /// cancelled.
    pub fn save(
        &mut self,
        store: &dyn ListingStore,
        mut listing: ServiceListing,
    ) -> Result<ServiceListing, SessionError> {
        if self.dialog.is_open() {
            return Err(CategoryError::StillOpen.into());
        }
        listing.provider_id.clone_from(&self.provider_id);
        listing.category = self.category();
        if let Some(draft) = &self.draft {
            listing.id.clone_from(&draft.id);
        }

        listing.validate()?;
        let saved = store.save(listing)?;
        info!(
            "saved listing {} for {}",
            saved.id.as_deref().unwrap_or_default(),
            self.provider_id
        );

        self.draft = Some(saved.clone());
        Ok(saved)
    }
}
