//! Prices service errors.

use tariff::pricing::PricingError;
use thiserror::Error;

use crate::{discounts::DiscountsServiceError, markups::MarkupsServiceError};

/// Prices service error variants.
#[derive(Debug, Error)]
pub enum PricesServiceError {
    /// The channel markup could not be read.
    #[error("failed to read channel markup")]
    Markups(#[from] MarkupsServiceError),

    /// The product's discount rules could not be read.
    #[error("failed to read discount rules")]
    Discounts(#[from] DiscountsServiceError),

    /// The price could not be composed from its inputs.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

impl PricesServiceError {
    /// Whether the error stems from the caller's input rather than a collaborator.
    ///
    /// Everything else is a failed computation.
    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        match self {
            Self::Pricing(_) => true,
            Self::Discounts(error) => error.is_bad_request(),
            Self::Markups(_) => false,
        }
    }
}
