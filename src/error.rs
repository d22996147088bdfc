//! Error types shared across the crate.
//!
//! Selection errors are programmer errors and propagate. Data availability
//! errors are meant to be shown to the user as a one-line notice.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while editing a catalogue selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CategoryError {
    /// An item was toggled under a catalogue that was never initialized.
    #[error("unknown catalogue '{0}'")]
    InvalidGroup(String),

    /// The dropdown was asked to open with no catalogue data loaded.
    #[error("No catalogue data available")]
    EmptyGroupData,

    /// A toggle arrived while the dropdown was closed.
    #[error("selection dropdown is not open")]
    NotOpen,

    /// The selection was read for saving before "Done" or "Cancel".
    #[error("selection dropdown is still open")]
    StillOpen,
}

/// Failure reported by a catalogue data source. The message is opaque.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SourceError(pub String);

/// Form validation failures, in the order the form checks them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter service title")]
    MissingTitle,
    #[error("Please enter description")]
    MissingDescription,
    #[error("Please enter pricing")]
    MissingPricing,
    #[error("Please select service area")]
    MissingServiceArea,
    #[error("Please select at least one day")]
    MissingAvailability,
    #[error("Please select contact preference")]
    MissingContactPreference,
    #[error("Please select catalogue & services")]
    MissingCategory,
    #[error("Invalid image URL '{url}': {reason}")]
    InvalidImageUrl { url: String, reason: String },
    #[error("Please sign in to leave a review")]
    MissingCustomer,
    #[error("Rating must be between 1 and 5 (got {0})")]
    InvalidRating(u8),
}

/// Errors from the listing and review store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Error: Not signed in")]
    NotSignedIn,

    #[error("Service title is required")]
    MissingTitle,

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("invalid identifier: '{0}'")]
    InvalidId(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("could not determine data directory")]
    NoDataDir,

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot store record: {0}")]
    Encode(String),

    #[error("failed to decode record {}: {message}", .path.display())]
    Decode { path: PathBuf, message: String },
}

/// Errors surfaced by an editing session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Error loading catalogues: {0}")]
    Groups(#[from] SourceError),

    #[error(transparent)]
    Category(#[from] CategoryError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
