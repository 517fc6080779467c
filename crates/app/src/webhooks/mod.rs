//! Webhooks
//!
//! Catalog events: a product update recalculates the product's prices in every channel it is
//! listed in, a new channel drops any cached markup for it.

pub mod errors;
pub mod handler;
pub mod models;

pub use errors::WebhookError;
pub use handler::WebhookHandler;
pub use models::{WebhookEvent, WebhookKind, WebhookOutcome, WebhookPayload};
