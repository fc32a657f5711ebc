use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a harvest run. Per-record lookup failures never surface
/// here; they become sentinel values on the record instead.
#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error("Incomplete search results: {successful}/{total} shards answered")]
    IncompleteShards { successful: u32, total: u32 },

    #[error("Malformed search response: {0}")]
    MalformedResponse(String),

    #[error("Search request failed: {0}")]
    Search(String),

    #[error("Failed to write {}: {message}", .path.display())]
    Export { path: PathBuf, message: String },
}

impl From<pushshift_client::PushshiftError> for HarvestError {
    fn from(err: pushshift_client::PushshiftError) -> Self {
        match err {
            pushshift_client::PushshiftError::Parse(msg) => HarvestError::MalformedResponse(msg),
            other => HarvestError::Search(other.to_string()),
        }
    }
}
