//! Catalog errors.

use thiserror::Error;

/// Catalog client error variants.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Transport failure talking to the catalog API.
    #[error("catalog request failed")]
    Http(#[from] reqwest::Error),

    /// The API answered with GraphQL errors.
    #[error("catalog API error: {0}")]
    Api(String),

    /// A metadata update was refused.
    #[error("metadata update rejected: {0}")]
    MetadataRejected(String),

    /// The referenced channel or product does not exist.
    #[error("catalog item not found: {0}")]
    NotFound(String),

    /// The response could not be understood.
    #[error("unexpected catalog response: {0}")]
    UnexpectedResponse(String),
}
