//! Common test fixtures for servicefinder unit tests.
//!
//! This module is only compiled when running tests.

#![allow(dead_code)]

use crate::catalogue::{Catalogue, CatalogueDocument};
use crate::format::GroupMap;
use crate::listing::ServiceListing;

/// Two catalogues with two services each, in load order.
pub fn sample_groups() -> GroupMap {
    let mut groups = GroupMap::new();
    groups.insert(
        "Home Services".to_string(),
        vec!["Plumbing".to_string(), "Electrical".to_string()],
    );
    groups.insert(
        "Automotive".to_string(),
        vec!["Oil Change".to_string(), "Tire Rotation".to_string()],
    );
    groups
}

/// The catalogue file equivalent of [`sample_groups`].
pub fn sample_document() -> CatalogueDocument {
    CatalogueDocument {
        catalogues: vec![
            Catalogue::new("Home Services", &["Plumbing", "Electrical"]),
            Catalogue::new("Automotive", &["Oil Change", "Tire Rotation"]),
        ],
    }
}

/// A listing that passes validation.
pub fn sample_listing(provider_id: &str) -> ServiceListing {
    ServiceListing {
        title: "Emergency Plumbing".to_string(),
        description: "Fast and reliable pipe repairs".to_string(),
        pricing: "$80/hour".to_string(),
        category: "Home Services: Plumbing".to_string(),
        service_area: "Downtown".to_string(),
        availability: "Mon, Tue, Fri".to_string(),
        contact_preference: "Phone".to_string(),
        ..ServiceListing::new(provider_id)
    }
}
