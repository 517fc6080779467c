//! Discounts service errors.

use tariff::discounts::ValidationErrors;
use thiserror::Error;

use crate::catalog::CatalogError;

/// Discounts service error variants.
#[derive(Debug, Error)]
pub enum DiscountsServiceError {
    /// Product was not found.
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// Submitted rules failed validation; nothing was written.
    #[error("invalid discount rules: {0}")]
    Validation(#[from] ValidationErrors),

    /// Rules could not be encoded for storage.
    #[error("failed to encode discount rules")]
    Encode(#[source] serde_json::Error),

    /// The catalog could not be read or written.
    #[error("catalog error")]
    Catalog(#[source] CatalogError),
}

impl DiscountsServiceError {
    /// Whether the error stems from the caller's input rather than a collaborator.
    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        matches!(self, Self::ProductNotFound(_) | Self::Validation(_))
    }
}

impl From<CatalogError> for DiscountsServiceError {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::NotFound(id) => Self::ProductNotFound(id),
            other => Self::Catalog(other),
        }
    }
}
