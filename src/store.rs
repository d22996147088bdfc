//! Listing persistence.
//!
//! Each listing lives in its own CCL file:
//! `<root>/providers/<provider>/services/<id>.ccl`. The most recently saved
//! listing of a provider doubles as the draft that pre-fills the form.
//! Reviews share the same root (see [`crate::review`]).

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use directories::ProjectDirs;
use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StoreError;
use crate::listing::ServiceListing;

pub const PROVIDERS_DIR: &str = "providers";
pub const SERVICES_DIR: &str = "services";
pub const RECORD_EXT: &str = "ccl";

/// Durable storage for service listings.
pub trait ListingStore {
    /// Insert (no id) or overwrite (id set) a listing, refreshing its
    /// timestamp. Returns the stored listing.
    fn save(&self, listing: ServiceListing) -> Result<ServiceListing, StoreError>;

    fn load(&self, provider_id: &str, id: &str) -> Result<ServiceListing, StoreError>;

    /// A provider's listings, newest first.
    fn list(&self, provider_id: &str) -> Result<Vec<ServiceListing>, StoreError>;

    /// Every provider's listings, newest first.
    fn all(&self) -> Result<Vec<ServiceListing>, StoreError>;

    /// The provider's most recent listing.
    fn latest(&self, provider_id: &str) -> Result<Option<ServiceListing>, StoreError> {
        Ok(self.list(provider_id)?.into_iter().next())
    }
}

/// Listing store backed by a directory of CCL files.
#[derive(Debug, Clone)]
pub struct FileListingStore {
    root: PathBuf,
}

impl FileListingStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store under the platform data directory.
    ///
    /// Location: `~/.local/share/servicefinder/` (Linux),
    /// `~/Library/Application Support/servicefinder/` (macOS)
    /// or `%APPDATA%\servicefinder\` (Windows)
    pub fn default_location() -> Result<Self, StoreError> {
        Ok(Self::new(default_data_dir()?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/providers/<provider>`, rejecting unsafe provider ids.
    pub(crate) fn provider_dir(&self, provider_id: &str) -> Result<PathBuf, StoreError> {
        Ok(self
            .root
            .join(PROVIDERS_DIR)
            .join(checked_component(provider_id)?))
    }

    fn services_dir(&self, provider_id: &str) -> Result<PathBuf, StoreError> {
        Ok(self.provider_dir(provider_id)?.join(SERVICES_DIR))
    }

    fn listing_path(&self, provider_id: &str, id: &str) -> Result<PathBuf, StoreError> {
        Ok(self
            .services_dir(provider_id)?
            .join(format!("{}.{RECORD_EXT}", checked_component(id)?)))
    }
}

impl ListingStore for FileListingStore {
    fn save(&self, mut listing: ServiceListing) -> Result<ServiceListing, StoreError> {
        if listing.provider_id.trim().is_empty() {
            return Err(StoreError::NotSignedIn);
        }
        if listing.title.trim().is_empty() {
            return Err(StoreError::MissingTitle);
        }

        let id = record_id(listing.id.as_deref());
        let path = self.listing_path(&listing.provider_id, &id)?;
        debug!("save listing {id} for {}", listing.provider_id);

        listing.id = Some(id);
        listing.updated_at = Utc::now();
        write_record(&path, &listing)?;

        Ok(listing)
    }

    fn load(&self, provider_id: &str, id: &str) -> Result<ServiceListing, StoreError> {
        let path = self.listing_path(provider_id, id)?;
        if !path.exists() {
            return Err(StoreError::NotFound(format!("{provider_id}/{id}")));
        }
        read_record(&path)
    }

    fn list(&self, provider_id: &str) -> Result<Vec<ServiceListing>, StoreError> {
        debug!("list listings: {provider_id}");
        let mut listings: Vec<ServiceListing> = read_records(&self.services_dir(provider_id)?)?;
        sort_newest_first(&mut listings);
        Ok(listings)
    }

    fn all(&self) -> Result<Vec<ServiceListing>, StoreError> {
        let providers_dir = self.root.join(PROVIDERS_DIR);
        let mut listings = Vec::new();

        if providers_dir.exists() {
            for entry in fs::read_dir(&providers_dir)? {
                let entry = entry?;
                if entry.file_type()?.is_dir() {
                    listings.extend(read_records::<ServiceListing>(
                        &entry.path().join(SERVICES_DIR),
                    )?);
                }
            }
        }

        sort_newest_first(&mut listings);
        Ok(listings)
    }
}

/// Get the default data directory.
pub fn default_data_dir() -> Result<PathBuf, StoreError> {
    let proj_dirs = ProjectDirs::from("", "", "servicefinder").ok_or(StoreError::NoDataDir)?;
    Ok(proj_dirs.data_dir().to_path_buf())
}

/// Encode a record as CCL, refusing values the encoding would alter.
///
/// CCL has no quoting, so a line break or `=` inside a text field either
/// truncates the value or makes the file unreadable. Padding is trimmed.
pub(crate) fn encode_record<T>(record: &T) -> Result<String, StoreError>
where
    T: Serialize + DeserializeOwned + PartialEq,
{
    let content = sickle::to_string(record).map_err(|e| StoreError::Encode(e.to_string()))?;
    match sickle::from_str::<T>(&content) {
        Ok(decoded) if decoded == *record => Ok(content),
        Ok(_) => Err(StoreError::Encode(UNSTORABLE_TEXT.to_string())),
        Err(e) => Err(StoreError::Encode(format!("{UNSTORABLE_TEXT} ({e})"))),
    }
}

const UNSTORABLE_TEXT: &str =
    "text would not read back unchanged (avoid line breaks, '=' and surrounding spaces)";

/// Write a record to `path`, creating parent directories.
pub(crate) fn write_record<T>(path: &Path, record: &T) -> Result<(), StoreError>
where
    T: Serialize + DeserializeOwned + PartialEq,
{
    let content = encode_record(record)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

pub(crate) fn read_record<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let content = fs::read_to_string(path)?;
    sickle::from_str(&content).map_err(|e| StoreError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Every readable record in `dir`. Unreadable files are skipped.
pub(crate) fn read_records<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>, StoreError> {
    let mut records = Vec::new();
    if !dir.exists() {
        return Ok(records);
    }

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|e| e == RECORD_EXT) {
            match read_record(&path) {
                Ok(record) => records.push(record),
                Err(e) => warn!("skipping unreadable record: {e}"),
            }
        }
    }
    Ok(records)
}

/// Keep a non-empty id, otherwise mint a new one.
pub(crate) fn record_id(id: Option<&str>) -> String {
    id.filter(|id| !id.is_empty())
        .map_or_else(|| uuid::Uuid::new_v4().simple().to_string(), str::to_string)
}

fn sort_newest_first(listings: &mut [ServiceListing]) {
    listings.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

/// Reject identifiers that are unsafe as a single path component.
pub(crate) fn checked_component(value: &str) -> Result<&str, StoreError> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(value)
    } else {
        Err(StoreError::InvalidId(value.to_string()))
    }
}
