//! Application configuration.
//!
//! Settings are read from command-line flags with environment fallbacks. A `.env` file in the
//! working directory is loaded first when present.

pub mod catalog;
pub mod logging;

pub use catalog::CatalogConfig;
pub use logging::{LogFormat, LoggingConfig};

/// Load `.env` into the process environment, ignoring a missing file.
pub fn load_dotenv() {
    _ = dotenvy::dotenv();
}
