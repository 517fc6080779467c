//! Markups

pub mod cache;
pub mod errors;
pub mod service;

pub use cache::MarkupCache;
pub use errors::MarkupsServiceError;
pub use service::*;
