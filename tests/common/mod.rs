//! Common test utilities for servicefinder integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use servicefinder::{Catalogue, CatalogueDocument, CatalogueFile};
use tempfile::TempDir;

/// Command for the servicefinder binary with the terminal UI disabled.
pub fn servicefinder_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_servicefinder"));
    cmd.env("SERVICEFINDER_NON_INTERACTIVE", "1")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

/// A temporary config directory, catalogue file and listing store.
pub struct TestContext {
    pub root: TempDir,
}

impl TestContext {
    /// Create a context whose catalogue file holds the sample catalogues.
    pub fn new() -> Self {
        let ctx = Self::empty();
        CatalogueFile::new(ctx.catalogue_path())
            .write(&sample_document())
            .expect("Failed to write catalogue file");
        ctx
    }

    /// Create a context without a catalogue file.
    pub fn empty() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir_all(root.path().join("config")).expect("Failed to create config dir");
        Self { root }
    }

    /// Replace the catalogue file with raw CCL.
    pub fn write_catalogue(&self, content: &str) {
        fs::write(self.catalogue_path(), content).expect("Failed to write catalogue file");
    }

    pub fn catalogue_path(&self) -> PathBuf {
        self.root.path().join("catalogues.ccl")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.path().join("data")
    }

    pub fn config_home(&self) -> PathBuf {
        self.root.path().join("config")
    }

    /// Binary command isolated to this context.
    pub fn cmd(&self) -> Command {
        let mut cmd = servicefinder_cmd();
        cmd.env("XDG_CONFIG_HOME", self.config_home())
            .arg("--catalogue")
            .arg(self.catalogue_path())
            .arg("--data-dir")
            .arg(self.data_dir());
        cmd
    }

    /// Binary command acting as a provider.
    pub fn provider_cmd(&self, provider: &str) -> Command {
        let mut cmd = self.cmd();
        cmd.args(["--provider", provider]);
        cmd
    }

    pub fn listing_files(&self, provider: &str) -> Vec<PathBuf> {
        let dir = self
            .data_dir()
            .join("providers")
            .join(provider)
            .join("services");
        list_files(&dir)
    }
}

fn list_files(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .map(|entries| entries.filter_map(|e| e.ok().map(|e| e.path())).collect())
        .unwrap_or_default()
}

/// Home Services [Plumbing, Electrical] then Automotive [Oil Change, Tire Rotation].
pub fn sample_document() -> CatalogueDocument {
    CatalogueDocument {
        catalogues: vec![
            Catalogue::new("Home Services", &["Plumbing", "Electrical"]),
            Catalogue::new("Automotive", &["Oil Change", "Tire Rotation"]),
        ],
    }
}

/// Arguments for a complete listing, category excluded.
pub fn listing_args(title: &str) -> Vec<String> {
    [
        "save",
        "--title",
        title,
        "--description",
        "Fast and reliable pipe repairs",
        "--pricing",
        "$80/hour",
        "--area",
        "Downtown",
        "--days",
        "Mon,Tue,Fri",
        "--contact",
        "Phone",
        "-y",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}
