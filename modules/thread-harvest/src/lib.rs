pub mod collector;
pub mod config;
pub mod credentials;
pub mod enricher;
pub mod error;
pub mod exporter;
pub mod pipeline;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod text;
pub mod traits;
pub mod types;

pub use config::HarvestConfig;
pub use error::HarvestError;
pub use pipeline::{run, RunStats};
