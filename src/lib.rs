//! servicefinder - Catalogue & services selection for provider listings.
//!
//! This library provides the category string format, the hierarchical
//! selection dropdown, and the listing and review storage used by the `servicefinder` CLI.

pub mod catalogue;
pub mod cli;
pub mod config;
pub mod dialog;
pub mod error;
pub mod format;
pub mod listing;
pub mod picker;
pub mod review;
pub mod selection;
pub mod session;
pub mod store;

#[cfg(test)]
mod testutil;

pub use catalogue::{Catalogue, CatalogueDocument, CatalogueFile, GroupSource};
pub use dialog::{DialogState, Row, SelectionDialog};
pub use error::{CategoryError, SessionError, SourceError, StoreError, ValidationError};
pub use format::{GroupMap, Selection};
pub use listing::ServiceListing;
pub use review::{RatingSummary, Review, ReviewStatus, ReviewStore};
pub use selection::SelectionState;
pub use session::EditorSession;
pub use store::{FileListingStore, ListingStore};
