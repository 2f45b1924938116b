//! Catalog work types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use atelier_core::{Price, PriceError, WorkId};

/// Longest title the catalog accepts.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Image used when a work is created without one.
pub const DEFAULT_IMAGE: &str = "temp.jpg";

/// A sellable catalog item (domain type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Work {
    /// Unique work ID.
    pub id: WorkId,
    /// Display title.
    pub title: String,
    /// Long description.
    pub description: String,
    /// Current unit price.
    pub price: Price,
    /// Image reference (path or URL).
    pub image: String,
    /// When the work was added to the catalog.
    pub posted_at: DateTime<Utc>,
}

/// Raw catalog input as submitted by a form, API client or import file.
///
/// The price arrives as text and is validated by [`NewWork::parse`].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Validated fields for creating or updating a work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWork {
    pub title: String,
    pub description: String,
    pub price: Price,
    pub image: String,
}

/// Catalog input that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkValidationError {
    #[error("title is required")]
    EmptyTitle,
    #[error("title is {0} characters long, the limit is {MAX_TITLE_LENGTH}")]
    TitleTooLong(usize),
    #[error(transparent)]
    Price(#[from] PriceError),
}

impl NewWork {
    /// Validate raw input.
    ///
    /// # Errors
    ///
    /// Returns `WorkValidationError` if the title is blank or too long, or the
    /// price text is not a valid non-negative amount.
    pub fn parse(input: WorkInput) -> Result<Self, WorkValidationError> {
        let title = input.title.trim().to_owned();
        if title.is_empty() {
            return Err(WorkValidationError::EmptyTitle);
        }
        let length = title.chars().count();
        if length > MAX_TITLE_LENGTH {
            return Err(WorkValidationError::TitleTooLong(length));
        }

        let price = Price::parse(&input.price)?;
        let image = input
            .image
            .map(|image| image.trim().to_owned())
            .filter(|image| !image.is_empty())
            .unwrap_or_else(|| DEFAULT_IMAGE.to_owned());

        Ok(Self {
            title,
            description: input.description,
            price,
            image,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str, price: &str) -> WorkInput {
        WorkInput {
            title: title.to_owned(),
            description: "Hand-painted".to_owned(),
            price: price.to_owned(),
            image: None,
        }
    }

    #[test]
    fn test_parse_valid_input() {
        let work = NewWork::parse(input("  Tea set ", "250.00")).unwrap();
        assert_eq!(work.title, "Tea set");
        assert_eq!(work.price, Price::from_cents(25_000).unwrap());
        assert_eq!(work.image, DEFAULT_IMAGE);
    }

    #[test]
    fn test_blank_title_rejected() {
        assert_eq!(
            NewWork::parse(input("   ", "1")),
            Err(WorkValidationError::EmptyTitle)
        );
    }

    #[test]
    fn test_long_title_counts_characters() {
        let exactly = "ж".repeat(MAX_TITLE_LENGTH);
        assert!(NewWork::parse(input(&exactly, "1")).is_ok());

        let too_long = "ж".repeat(MAX_TITLE_LENGTH + 1);
        assert_eq!(
            NewWork::parse(input(&too_long, "1")),
            Err(WorkValidationError::TitleTooLong(MAX_TITLE_LENGTH + 1))
        );
    }

    #[test]
    fn test_malformed_price_is_not_zero() {
        let err = NewWork::parse(input("Vase", "free")).unwrap_err();
        assert!(matches!(err, WorkValidationError::Price(PriceError::Malformed(_))));
    }

    #[test]
    fn test_explicit_image_kept() {
        let mut raw = input("Vase", "10");
        raw.image = Some("vase.jpg".to_owned());
        assert_eq!(NewWork::parse(raw).unwrap().image, "vase.jpg");
    }
}
