//! Catalogue data sources.
//!
//! A catalogue is a named group of services. Sources hand back a
//! [`GroupMap`] in display order; failures carry only a message.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::format::GroupMap;

/// Supplies catalogue names and their services.
pub trait GroupSource {
    fn load_groups(&self) -> Result<GroupMap, SourceError>;
}

/// An already loaded map is its own source.
impl GroupSource for GroupMap {
    fn load_groups(&self) -> Result<GroupMap, SourceError> {
        Ok(self.clone())
    }
}

/// One catalogue entry as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Catalogue {
    /// Stable identifier, used as the name when no title is set.
    #[serde(default)]
    pub id: Option<String>,
    /// Display name.
    #[serde(default)]
    pub title: Option<String>,
    /// Services offered under this catalogue, in display order.
    #[serde(default)]
    pub services: Vec<String>,
}

impl Catalogue {
    pub fn new(title: &str, services: &[&str]) -> Self {
        Self {
            id: None,
            title: Some(title.to_string()),
            services: services.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Title, falling back to the id. `None` when both are blank.
    pub fn display_name(&self) -> Option<&str> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .or_else(|| self.id.as_deref().map(str::trim).filter(|i| !i.is_empty()))
    }
}

/// Contents of a catalogue file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CatalogueDocument {
    #[serde(default)]
    pub catalogues: Vec<Catalogue>,
}

impl CatalogueDocument {
    /// Build the dropdown map.
    ///
    /// Catalogues without a name or without services are left out. A repeated
    /// name keeps its first position and takes the later service list.
    pub fn group_map(&self) -> GroupMap {
        let mut groups = GroupMap::new();
        for catalogue in &self.catalogues {
            let Some(name) = catalogue.display_name() else {
                warn!("skipping catalogue without title or id");
                continue;
            };
            if catalogue.services.is_empty() {
                debug!("skipping catalogue without services: {name}");
                continue;
            }
            groups.insert(name.to_string(), catalogue.services.clone());
        }
        groups
    }

    pub fn to_ccl(&self) -> anyhow::Result<String> {
        sickle::to_string(self).map_err(|e| anyhow::anyhow!("Failed to serialize catalogues: {e}"))
    }
}

/// Catalogues read from a CCL file.
///
/// ```text
/// catalogues =
///   =
///     title = Home Services
///     services =
///       = Plumbing
///       = Electrical
/// ```
#[derive(Debug, Clone)]
pub struct CatalogueFile {
    path: PathBuf,
}

impl CatalogueFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the whole file.
    pub fn read(&self) -> Result<CatalogueDocument, SourceError> {
        debug!("reading catalogues from {}", self.path.display());
        let content = fs::read_to_string(&self.path).map_err(|e| {
            SourceError(format!(
                "Failed to read catalogue file {}: {e}",
                self.path.display()
            ))
        })?;

        sickle::from_str(&content).map_err(|e| {
            SourceError(format!(
                "Failed to parse catalogue file {}: {e}",
                self.path.display()
            ))
        })
    }

    /// Write a document to the file, creating parent directories.
    pub fn write(&self, document: &CatalogueDocument) -> anyhow::Result<()> {
        use anyhow::Context;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::write(&self.path, document.to_ccl()?)
            .with_context(|| format!("Failed to write catalogue file: {}", self.path.display()))
    }
}

impl GroupSource for CatalogueFile {
    fn load_groups(&self) -> Result<GroupMap, SourceError> {
        Ok(self.read()?.group_map())
    }
}
