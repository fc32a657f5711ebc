// Test mocks for the harvest pipeline.
//
// Two mocks matching the two trait boundaries:
// - MockSearchIndex (SearchIndex): scripted page sequence, records every query
// - MockLiveLookup (LiveLookup): HashMap-based id → thread or failure
//
// Plus builders for submissions, pages and records.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use pushshift_client::{
    AggBucket, Aggregations, Metadata, PushshiftError, SearchQuery, SearchResponse, Shards,
    Submission,
};

use crate::traits::{LiveLookup, SearchIndex};
use crate::types::{
    utc_date, EnrichedRecord, LiveThread, LookupFailure, Reply, SearchRecord, TopReply,
};

/// Shard count used by well-formed test pages.
pub const TEST_SHARDS: u32 = 74;

/// 2021-01-07T06:13:20Z
pub const TEST_CREATED_UTC: i64 = 1_610_000_000;

// ---------------------------------------------------------------------------
// MockSearchIndex
// ---------------------------------------------------------------------------

/// Returns scripted pages (or errors) in order. Once the script runs out every
/// call fails, so a collector that never stops shows up as an error rather than a hang.
pub struct MockSearchIndex {
    pages: Mutex<VecDeque<Result<SearchResponse, PushshiftError>>>,
    queries: Mutex<Vec<SearchQuery>>,
}

impl MockSearchIndex {
    pub fn new() -> Self {
        Self {
            pages: Mutex::new(VecDeque::new()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn then(self, page: SearchResponse) -> Self {
        self.pages.lock().unwrap().push_back(Ok(page));
        self
    }

    pub fn then_error(self, err: PushshiftError) -> Self {
        self.pages.lock().unwrap().push_back(Err(err));
        self
    }

    /// Every query received, in order.
    pub fn queries(&self) -> Vec<SearchQuery> {
        self.queries.lock().unwrap().clone()
    }
}

impl Default for MockSearchIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchIndex for MockSearchIndex {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, PushshiftError> {
        self.queries.lock().unwrap().push(query.clone());
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(PushshiftError::Network(
                    "MockSearchIndex: no more pages".to_string(),
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// MockLiveLookup
// ---------------------------------------------------------------------------

/// HashMap-based live lookup. Unregistered ids fail with a transport error.
pub struct MockLiveLookup {
    threads: HashMap<String, Result<LiveThread, LookupFailure>>,
    calls: Mutex<Vec<String>>,
}

impl MockLiveLookup {
    pub fn new() -> Self {
        Self {
            threads: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Register a live thread; `top_reply` is `(score, raw body)`.
    pub fn on_thread(mut self, id: &str, score: i64, top_reply: Option<(i64, &str)>) -> Self {
        let thread = LiveThread {
            score,
            top_reply: top_reply.map(|(score, body)| Reply {
                score,
                body: body.to_string(),
            }),
        };
        self.threads.insert(id.to_string(), Ok(thread));
        self
    }

    pub fn on_failure(mut self, id: &str, failure: LookupFailure) -> Self {
        self.threads.insert(id.to_string(), Err(failure));
        self
    }

    /// Ids looked up, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockLiveLookup {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LiveLookup for MockLiveLookup {
    async fn lookup(&self, id: &str) -> Result<LiveThread, LookupFailure> {
        self.calls.lock().unwrap().push(id.to_string());
        self.threads.get(id).cloned().unwrap_or_else(|| {
            Err(LookupFailure::Transport(format!(
                "MockLiveLookup: no thread registered for {id}"
            )))
        })
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn submission(id: &str, created_utc: i64, score: i64) -> Submission {
    Submission {
        id: id.to_string(),
        subreddit: "AskFeminists".to_string(),
        full_link: format!("https://www.reddit.com/r/AskFeminists/comments/{id}/"),
        title: Some(format!("Title {id}")),
        selftext: Some(format!("Body {id}")),
        author: format!("author_{id}"),
        created_utc,
        num_comments: 2,
        score,
    }
}

pub fn search_record(id: &str, created_utc: i64, score: i64) -> SearchRecord {
    submission(id, created_utc, score).into()
}

/// Well-formed page with every shard answering.
pub fn page(data: Vec<Submission>) -> SearchResponse {
    page_with_shards(data, TEST_SHARDS, TEST_SHARDS)
}

pub fn page_with_shards(data: Vec<Submission>, successful: u32, total: u32) -> SearchResponse {
    let total_results = data.len() as u64;
    SearchResponse {
        data,
        metadata: Metadata {
            total_results: Some(total_results),
            shards: Shards {
                successful,
                total,
                failed: total - successful.min(total),
            },
        },
        aggs: None,
    }
}

pub fn page_with_aggs(
    data: Vec<Submission>,
    authors: &[(&str, u64)],
    subreddits: &[(&str, u64)],
) -> SearchResponse {
    SearchResponse {
        aggs: Some(Aggregations {
            author: buckets(authors),
            subreddit: buckets(subreddits),
        }),
        ..page(data)
    }
}

fn buckets(pairs: &[(&str, u64)]) -> Vec<AggBucket> {
    pairs
        .iter()
        .map(|&(key, doc_count)| AggBucket {
            key: key.to_string(),
            doc_count,
        })
        .collect()
}

/// Exported-shape record; `reply_score: None` means no reply was available.
pub fn enriched_record(id: &str, score: i64, reply_score: Option<i64>) -> EnrichedRecord {
    EnrichedRecord {
        id: id.to_string(),
        subreddit: "AskFeminists".to_string(),
        full_link: format!("https://www.reddit.com/r/AskFeminists/comments/{id}/"),
        keywords: "bias|prejudice".to_string(),
        date: utc_date(TEST_CREATED_UTC),
        score,
        num_comments: 2,
        author: format!("author_{id}"),
        title: format!("Title {id}"),
        selftext: format!("Body {id}"),
        top_reply: match reply_score {
            Some(score) => TopReply::Available(Reply {
                score,
                body: format!("Reply {id}"),
            }),
            None => TopReply::Unavailable(LookupFailure::NoReplies),
        },
    }
}
