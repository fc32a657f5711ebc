// Trait boundaries for the two external services.
//
// SearchIndex: one page of historical search results per call.
// LiveLookup: current score + top reply for one submission.
//
// The real clients implement these directly; tests swap in MockSearchIndex and
// MockLiveLookup from `testing`.

use async_trait::async_trait;
use pushshift_client::{PushshiftClient, PushshiftError, SearchQuery, SearchResponse};
use reddit_client::{RedditClient, RedditError};

use crate::types::{LiveThread, LookupFailure, Reply, NOT_AVAILABLE};

// ---------------------------------------------------------------------------
// SearchIndex
// ---------------------------------------------------------------------------

#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Fetch a single page for `query`.
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, PushshiftError>;
}

#[async_trait]
impl SearchIndex for PushshiftClient {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, PushshiftError> {
        self.search_submissions(query).await
    }
}

// ---------------------------------------------------------------------------
// LiveLookup
// ---------------------------------------------------------------------------

#[async_trait]
pub trait LiveLookup: Send + Sync {
    /// Point lookup of a submission by id. Reply bodies come back raw.
    async fn lookup(&self, id: &str) -> Result<LiveThread, LookupFailure>;
}

#[async_trait]
impl LiveLookup for RedditClient {
    async fn lookup(&self, id: &str) -> Result<LiveThread, LookupFailure> {
        let found = self.submission_with_top_comment(id).await?;
        Ok(LiveThread {
            score: found.link.score,
            top_reply: found.top_comment.map(|c| Reply {
                score: c.score,
                body: c.body.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            }),
        })
    }
}

impl From<RedditError> for LookupFailure {
    fn from(err: RedditError) -> Self {
        match err {
            RedditError::NotFound(_) => LookupFailure::NotFound,
            RedditError::Forbidden(_) => LookupFailure::Forbidden,
            RedditError::RateLimited => LookupFailure::RateLimited,
            RedditError::Parse(msg) => LookupFailure::Malformed(msg),
            other => LookupFailure::Transport(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reddit_errors_map_to_failure_kinds() {
        assert_eq!(
            LookupFailure::from(RedditError::NotFound("gone".into())),
            LookupFailure::NotFound
        );
        assert_eq!(
            LookupFailure::from(RedditError::RateLimited),
            LookupFailure::RateLimited
        );
        assert!(matches!(
            LookupFailure::from(RedditError::Network("timeout".into())),
            LookupFailure::Transport(_)
        ));
        assert!(matches!(
            LookupFailure::from(RedditError::Parse("eof".into())),
            LookupFailure::Malformed(_)
        ));
    }
}
