//! Markups service errors.

use tariff::markups::MarkupError;
use thiserror::Error;

use crate::catalog::CatalogError;

/// Markups service error variants.
#[derive(Debug, Error)]
pub enum MarkupsServiceError {
    /// The catalog could not be read or written.
    #[error("catalog error")]
    Catalog(#[from] CatalogError),

    /// A channel's stored markup is not a valid percentage.
    #[error("channel {channel_id} has an invalid stored markup")]
    InvalidStoredMarkup {
        channel_id: String,
        #[source]
        source: MarkupError,
    },
}
