use serde::{Deserialize, Serialize};

/// Largest `size` the submission search endpoint honors.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Field projection requested for every submission.
pub const SUBMISSION_FIELDS: &str =
    "id,score,full_link,subreddit,title,selftext,created_utc,author,num_comments";

/// Aggregations requested alongside the first page.
pub const SUBMISSION_AGGS: &str = "subreddit,author";

// --- Request ---

/// Query string for `/reddit/search/submission/`.
///
/// Serialized straight into the URL, so field names are the wire parameter names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    pub q: String,
    /// Comma-joined subreddit names.
    pub subreddit: String,
    pub fields: String,
    pub size: u32,
    pub sort: String,
    pub metadata: bool,
    /// Exclusive upper bound on `created_utc`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<i64>,
    /// Exclusive lower bound on `created_utc`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggs: Option<String>,
}

impl SearchQuery {
    /// Newest-first submission search over `subreddits` matching `keywords`.
    pub fn submissions<'a>(
        keywords: &str,
        subreddits: impl IntoIterator<Item = &'a str>,
        size: u32,
    ) -> Self {
        Self {
            q: keywords.to_string(),
            subreddit: subreddits.into_iter().collect::<Vec<_>>().join(","),
            fields: SUBMISSION_FIELDS.to_string(),
            size: size.min(MAX_PAGE_SIZE),
            sort: "desc".to_string(),
            metadata: true,
            before: None,
            after: None,
            aggs: None,
        }
    }

    pub fn before(mut self, created_utc: i64) -> Self {
        self.before = Some(created_utc);
        self
    }

    pub fn after(mut self, created_utc: i64) -> Self {
        self.after = Some(created_utc);
        self
    }

    pub fn with_aggs(mut self) -> Self {
        self.aggs = Some(SUBMISSION_AGGS.to_string());
        self
    }
}

// --- Response ---

/// One page of submission search results.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub data: Vec<Submission>,
    pub metadata: Metadata,
    #[serde(default)]
    pub aggs: Option<Aggregations>,
}

/// A single archived submission, restricted to [`SUBMISSION_FIELDS`].
///
/// `title` and `selftext` are absent on some archived posts (link posts, removed bodies).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Submission {
    pub id: String,
    pub subreddit: String,
    pub full_link: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub selftext: Option<String>,
    pub author: String,
    pub created_utc: i64,
    pub num_comments: i64,
    pub score: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub total_results: Option<u64>,
    pub shards: Shards,
}

/// Elasticsearch shard accounting for a single query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Shards {
    pub successful: u32,
    pub total: u32,
    #[serde(default)]
    pub failed: u32,
}

impl Shards {
    /// True when every shard answered, i.e. the page covers the full archive.
    pub fn is_complete(&self) -> bool {
        self.successful == self.total
    }
}

/// Index-side frequency tables. Only present when `aggs` was requested.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Aggregations {
    #[serde(default)]
    pub author: Vec<AggBucket>,
    #[serde(default)]
    pub subreddit: Vec<AggBucket>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AggBucket {
    pub key: String,
    pub doc_count: u64,
}
