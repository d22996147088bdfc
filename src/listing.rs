//! Service listings offered by providers.
//!
//! A listing carries its catalogue selection as a category string (see
//! [`crate::format`]) and its availability as a day list such as
//! `"Mon, Tue, Fri"`.

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ValidationError;
use crate::format;

/// Status given to newly saved listings.
pub const DEFAULT_STATUS: &str = "Active";

/// Days in availability order.
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Stored (untranslated) abbreviation for a day.
pub const fn day_abbrev(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

/// Format days as stored, always in Mon..Sun order.
pub fn format_availability(days: &[Weekday]) -> String {
    WEEK.iter()
        .filter(|day| days.contains(day))
        .map(|day| day_abbrev(*day))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Days mentioned in a stored availability string.
///
/// Matches on the abbreviation appearing anywhere in the text.
pub fn parse_availability(text: &str) -> Vec<Weekday> {
    WEEK.into_iter()
        .filter(|day| text.contains(day_abbrev(*day)))
        .collect()
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

/// A service offering as persisted by the listing store.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServiceListing {
    /// Assigned by the store on first save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub provider_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pricing: String,
    /// Category string, e.g. `Home Services: Plumbing | Automotive: Oil Change`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub service_area: String,
    /// Day list, e.g. `Mon, Tue, Fri`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub availability: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub contact_preference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    pub updated_at: DateTime<Utc>,
}

impl ServiceListing {
    /// Create an empty, unsaved listing for a provider.
    pub fn new(provider_id: &str) -> Self {
        Self {
            id: None,
            provider_id: provider_id.to_string(),
            title: String::new(),
            description: String::new(),
            pricing: String::new(),
            category: String::new(),
            service_area: String::new(),
            availability: String::new(),
            contact_preference: String::new(),
            image_url: None,
            status: default_status(),
            updated_at: Utc::now(),
        }
    }

    /// Check form fields in the order the provider form reports them.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::MissingDescription);
        }
        if self.pricing.trim().is_empty() {
            return Err(ValidationError::MissingPricing);
        }
        if self.service_area.trim().is_empty() {
            return Err(ValidationError::MissingServiceArea);
        }
        if self.days().is_empty() {
            return Err(ValidationError::MissingAvailability);
        }
        if self.contact_preference.trim().is_empty() {
            return Err(ValidationError::MissingContactPreference);
        }
        if self.category.trim().is_empty() {
            return Err(ValidationError::MissingCategory);
        }
        if let Some(url) = self.image_url.as_deref().filter(|u| !u.is_empty()) {
            Url::parse(url).map_err(|e| ValidationError::InvalidImageUrl {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    /// Available days.
    pub fn days(&self) -> Vec<Weekday> {
        parse_availability(&self.availability)
    }

    pub fn set_days(&mut self, days: &[Weekday]) {
        self.availability = format_availability(days);
    }

    /// Catalogue names this listing is filed under.
    pub fn catalogues(&self) -> Vec<String> {
        format::segment_groups(&self.category)
    }

    pub fn has_image(&self) -> bool {
        self.image_url.as_deref().is_some_and(|u| !u.is_empty())
    }
}

/// Listings whose title, description or category contain `query`,
/// ignoring case. A blank query matches everything.
pub fn search<'a>(listings: &'a [ServiceListing], query: &str) -> Vec<&'a ServiceListing> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return listings.iter().collect();
    }

    listings
        .iter()
        .filter(|listing| {
            [&listing.title, &listing.description, &listing.category]
                .iter()
                .any(|field| field.to_lowercase().contains(&query))
        })
        .collect()
}

/// Listings filed under a catalogue.
pub fn filter_by_catalogue<'a>(
    listings: &'a [ServiceListing],
    catalogue: &str,
) -> Vec<&'a ServiceListing> {
    let catalogue = catalogue.trim();
    listings
        .iter()
        .filter(|listing| listing.catalogues().iter().any(|c| c == catalogue))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::sample_listing;

    #[test]
    fn availability_is_formatted_in_week_order() {
        let days = [Weekday::Fri, Weekday::Mon, Weekday::Tue];
        assert_eq!(format_availability(&days), "Mon, Tue, Fri");
        assert_eq!(format_availability(&[]), "");
    }

    #[test]
    fn availability_parsing_uses_containment() {
        assert_eq!(
            parse_availability("Mon, Wed, Sun"),
            vec![Weekday::Mon, Weekday::Wed, Weekday::Sun]
        );
        assert_eq!(parse_availability("Sat/Sun"), vec![Weekday::Sat, Weekday::Sun]);
        assert!(parse_availability("").is_empty());
    }

    #[test]
    fn valid_listing_passes() {
        assert_eq!(sample_listing("p1").validate(), Ok(()));
    }

    #[test]
    fn validation_reports_first_missing_field() {
        let mut listing = sample_listing("p1");
        listing.pricing = "  ".to_string();
        listing.contact_preference.clear();
        assert_eq!(listing.validate(), Err(ValidationError::MissingPricing));

        let mut listing = sample_listing("p1");
        listing.availability = "whenever".to_string();
        assert_eq!(listing.validate(), Err(ValidationError::MissingAvailability));

        let mut listing = sample_listing("p1");
        listing.category.clear();
        assert_eq!(listing.validate(), Err(ValidationError::MissingCategory));

        let listing = ServiceListing::new("p1");
        assert_eq!(listing.validate(), Err(ValidationError::MissingTitle));
    }

    #[test]
    fn validation_rejects_bad_image_url() {
        let mut listing = sample_listing("p1");
        listing.image_url = Some("not a url".to_string());
        assert!(matches!(
            listing.validate(),
            Err(ValidationError::InvalidImageUrl { .. })
        ));

        listing.image_url = Some(String::new());
        assert_eq!(listing.validate(), Ok(()));
        assert!(!listing.has_image());
    }

    #[test]
    fn search_matches_title_description_and_category() {
        let mut leak = sample_listing("p1");
        leak.title = "Leak Repair".to_string();
        let mut tires = sample_listing("p2");
        tires.title = "Tire Swap".to_string();
        tires.description = "Seasonal tires".to_string();
        tires.category = "Automotive: Tire Rotation".to_string();
        let listings = vec![leak, tires];

        assert_eq!(search(&listings, "leak").len(), 1);
        assert_eq!(search(&listings, "AUTOMOTIVE")[0].title, "Tire Swap");
        assert_eq!(search(&listings, "  ").len(), 2);
        assert!(search(&listings, "gardening").is_empty());
    }

    #[test]
    fn filter_by_catalogue_matches_segments() {
        let mut home = sample_listing("p1");
        home.category = "Home Services: Plumbing".to_string();
        let mut both = sample_listing("p2");
        both.category = "Home Services: Electrical | Automotive: Oil Change".to_string();
        let listings = vec![home, both];

        assert_eq!(filter_by_catalogue(&listings, "Home Services").len(), 2);
        assert_eq!(filter_by_catalogue(&listings, "Automotive").len(), 1);
        assert!(filter_by_catalogue(&listings, "Auto").is_empty());
    }

    #[test]
    fn set_days_round_trips() {
        let mut listing = ServiceListing::new("p1");
        listing.set_days(&[Weekday::Sun, Weekday::Wed]);
        assert_eq!(listing.availability, "Wed, Sun");
        assert_eq!(listing.days(), vec![Weekday::Wed, Weekday::Sun]);
    }
}
