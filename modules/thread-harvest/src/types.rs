use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};

/// Written wherever a value could not be obtained.
pub const NOT_AVAILABLE: &str = "N/A";

// --- Collected ---

/// One submission as archived by the search index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRecord {
    pub id: String,
    pub subreddit: String,
    pub full_link: String,
    pub title: Option<String>,
    pub selftext: Option<String>,
    pub author: String,
    pub created_utc: i64,
    pub num_comments: i64,
    /// Score at archive time.
    pub score: i64,
}

impl From<pushshift_client::Submission> for SearchRecord {
    fn from(s: pushshift_client::Submission) -> Self {
        Self {
            id: s.id,
            subreddit: s.subreddit,
            full_link: s.full_link,
            title: s.title,
            selftext: s.selftext,
            author: s.author,
            created_utc: s.created_utc,
            num_comments: s.num_comments,
            score: s.score,
        }
    }
}

/// A `key, count` row from the index's aggregation metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateBucket {
    pub key: String,
    pub count: u64,
}

impl From<pushshift_client::AggBucket> for AggregateBucket {
    fn from(b: pushshift_client::AggBucket) -> Self {
        Self {
            key: b.key,
            count: b.doc_count,
        }
    }
}

/// Frequency tables captured from the first search page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregates {
    pub authors: Vec<AggregateBucket>,
    pub subreddits: Vec<AggregateBucket>,
}

impl From<pushshift_client::Aggregations> for Aggregates {
    fn from(aggs: pushshift_client::Aggregations) -> Self {
        Self {
            authors: aggs.author.into_iter().map(Into::into).collect(),
            subreddits: aggs.subreddit.into_iter().map(Into::into).collect(),
        }
    }
}

// --- Live lookup ---

/// Current state of a submission according to the live API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveThread {
    pub score: i64,
    pub top_reply: Option<Reply>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub score: i64,
    pub body: String,
}

/// Why a record has no top reply attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupFailure {
    /// Lookup succeeded but the thread has no comments.
    NoReplies,
    /// Thread deleted or never existed on the live site.
    NotFound,
    /// Private, quarantined or banned community.
    Forbidden,
    RateLimited,
    /// Network or unexpected HTTP failure.
    Transport(String),
    /// Live API answered with something unparseable.
    Malformed(String),
}

impl LookupFailure {
    /// True for the one outcome that is routine rather than a failed lookup:
    /// the thread exists but nobody replied.
    pub fn is_routine(&self) -> bool {
        matches!(self, LookupFailure::NoReplies)
    }
}

impl fmt::Display for LookupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupFailure::NoReplies => write!(f, "no replies"),
            LookupFailure::NotFound => write!(f, "not found"),
            LookupFailure::Forbidden => write!(f, "forbidden"),
            LookupFailure::RateLimited => write!(f, "rate limited"),
            LookupFailure::Transport(msg) => write!(f, "transport error: {msg}"),
            LookupFailure::Malformed(msg) => write!(f, "malformed response: {msg}"),
        }
    }
}

// --- Enriched ---

/// The highest-ranked reply, or the reason it is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopReply {
    Available(Reply),
    Unavailable(LookupFailure),
}

impl TopReply {
    pub fn score(&self) -> Option<i64> {
        match self {
            TopReply::Available(reply) => Some(reply.score),
            TopReply::Unavailable(_) => None,
        }
    }

    pub fn score_field(&self) -> String {
        self.score()
            .map(|s| s.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    pub fn body_field(&self) -> &str {
        match self {
            TopReply::Available(reply) => &reply.body,
            TopReply::Unavailable(_) => NOT_AVAILABLE,
        }
    }
}

/// A search record refreshed against the live API and ready for export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedRecord {
    pub id: String,
    pub subreddit: String,
    pub full_link: String,
    /// Keyword filter that produced this record.
    pub keywords: String,
    pub date: Option<NaiveDate>,
    /// Live score, or the archived one when the lookup failed outright.
    pub score: i64,
    pub num_comments: i64,
    pub author: String,
    pub title: String,
    pub selftext: String,
    pub top_reply: TopReply,
}

impl EnrichedRecord {
    /// Overview ordering: score descending, then reply score descending with
    /// missing reply scores after every present one.
    pub fn overview_order(a: &Self, b: &Self) -> Ordering {
        b.score.cmp(&a.score).then_with(|| {
            match (a.top_reply.score(), b.top_reply.score()) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        })
    }
}

/// Calendar date (UTC) of a unix timestamp.
pub fn utc_date(created_utc: i64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp(created_utc, 0).map(|dt| dt.date_naive())
}
