//! Webhook errors.

use thiserror::Error;

use crate::catalog::CatalogError;

/// Webhook handling error variants.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The payload does not describe the event it was delivered as.
    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),

    /// The catalog could not be read.
    #[error("catalog error")]
    Catalog(#[from] CatalogError),
}
