//! Customer reviews of providers.
//!
//! Reviews are stored next to the provider's listings:
//! `<root>/providers/<provider>/reviews/<id>.ccl`. Only active reviews count
//! towards a provider's rating.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, ValidationError};
use crate::store::{
    FileListingStore, RECORD_EXT, checked_component, read_record, read_records, record_id,
    write_record,
};

pub const REVIEWS_DIR: &str = "reviews";

/// Lowest and highest star rating.
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Moderation state of a review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum ReviewStatus {
    #[default]
    Active,
    Hidden,
    Flagged,
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Active => "Active",
            Self::Hidden => "Hidden",
            Self::Flagged => "Flagged",
        };
        f.write_str(name)
    }
}

impl FromStr for ReviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "hidden" => Ok(Self::Hidden),
            "flagged" => Ok(Self::Flagged),
            other => Err(format!(
                "unknown review status '{other}' (expected active, hidden or flagged)"
            )),
        }
    }
}

/// A customer's rating of a provider, optionally for one of its services.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Review {
    /// Assigned by the store on first save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub provider_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    pub customer_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub customer_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
    pub rating: u8,
    #[serde(default)]
    pub status: ReviewStatus,
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// A new, active review.
    pub fn new(provider_id: &str, customer_id: &str, rating: u8) -> Self {
        Self {
            id: None,
            provider_id: provider_id.to_string(),
            service_id: None,
            customer_id: customer_id.to_string(),
            customer_name: String::new(),
            comment: String::new(),
            rating,
            status: ReviewStatus::Active,
            created_at: Utc::now(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.customer_id.trim().is_empty() {
            return Err(ValidationError::MissingCustomer);
        }
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(ValidationError::InvalidRating(self.rating));
        }
        Ok(())
    }

    /// Name to show for the reviewer.
    pub fn author(&self) -> &str {
        if self.customer_name.trim().is_empty() {
            &self.customer_id
        } else {
            &self.customer_name
        }
    }
}

/// Mean rating over a provider's active reviews.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RatingSummary {
    pub average: f64,
    pub count: usize,
}

impl fmt::Display for RatingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.count {
            0 => f.write_str("⭐ New"),
            1 => write!(f, "⭐ {:.1} (1 review)", self.average),
            n => write!(f, "⭐ {:.1} ({n} reviews)", self.average),
        }
    }
}

/// Average the active reviews. No active reviews gives `0.0` over `0`.
pub fn average_rating(reviews: &[Review]) -> RatingSummary {
    let (total, count) = reviews
        .iter()
        .filter(|r| r.status == ReviewStatus::Active)
        .fold((0u32, 0usize), |(total, count), r| {
            (total + u32::from(r.rating), count + 1)
        });

    if count == 0 {
        return RatingSummary::default();
    }
    #[allow(clippy::cast_precision_loss)]
    let average = f64::from(total) / count as f64;
    RatingSummary { average, count }
}

/// Durable storage for reviews.
pub trait ReviewStore {
    /// Insert (no id) or overwrite (id set) a review.
    fn save_review(&self, review: Review) -> Result<Review, StoreError>;

    fn load_review(&self, provider_id: &str, id: &str) -> Result<Review, StoreError>;

    /// Every review of a provider regardless of status, newest first.
    fn reviews_for_provider(&self, provider_id: &str) -> Result<Vec<Review>, StoreError>;

    /// Change a review's moderation status.
    fn set_review_status(
        &self,
        provider_id: &str,
        id: &str,
        status: ReviewStatus,
    ) -> Result<Review, StoreError> {
        let mut review = self.load_review(provider_id, id)?;
        review.status = status;
        self.save_review(review)
    }

    fn average_rating(&self, provider_id: &str) -> Result<RatingSummary, StoreError> {
        Ok(average_rating(&self.reviews_for_provider(provider_id)?))
    }
}

impl FileListingStore {
    fn review_path(&self, provider_id: &str, id: &str) -> Result<PathBuf, StoreError> {
        Ok(self
            .provider_dir(provider_id)?
            .join(REVIEWS_DIR)
            .join(format!("{}.{RECORD_EXT}", checked_component(id)?)))
    }
}

impl ReviewStore for FileListingStore {
    fn save_review(&self, mut review: Review) -> Result<Review, StoreError> {
        if review.provider_id.trim().is_empty() {
            return Err(StoreError::NotSignedIn);
        }
        review.validate()?;

        let id = record_id(review.id.as_deref());
        let path = self.review_path(&review.provider_id, &id)?;
        debug!("save review {id} for {}", review.provider_id);

        review.id = Some(id);
        write_record(&path, &review)?;
        Ok(review)
    }

    fn load_review(&self, provider_id: &str, id: &str) -> Result<Review, StoreError> {
        let path = self.review_path(provider_id, id)?;
        if !path.exists() {
            return Err(StoreError::NotFound(format!("{provider_id}/{REVIEWS_DIR}/{id}")));
        }
        read_record(&path)
    }

    fn reviews_for_provider(&self, provider_id: &str) -> Result<Vec<Review>, StoreError> {
        debug!("list reviews: {provider_id}");
        let dir = self.provider_dir(provider_id)?.join(REVIEWS_DIR);
        let mut reviews: Vec<Review> = read_records(&dir)?;
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }
}
