pub mod error;
pub mod types;

pub use error::{PushshiftError, Result};
pub use types::{
    AggBucket, Aggregations, Metadata, SearchQuery, SearchResponse, Shards, Submission,
    MAX_PAGE_SIZE, SUBMISSION_AGGS, SUBMISSION_FIELDS,
};

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.pushshift.io";

const SUBMISSION_SEARCH_PATH: &str = "/reddit/search/submission/";

pub struct PushshiftClient {
    client: reqwest::Client,
    base_url: String,
}

impl PushshiftClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch one page of submission search results.
    pub async fn search_submissions(&self, query: &SearchQuery) -> Result<SearchResponse> {
        let url = format!("{}{}", self.base_url, SUBMISSION_SEARCH_PATH);
        tracing::debug!(
            q = %query.q,
            before = ?query.before,
            aggs = query.aggs.is_some(),
            "Pushshift submission search"
        );

        let resp = self.client.get(&url).query(query).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PushshiftError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        // Decode from text so a truncated or non-JSON body surfaces as a parse error.
        let body = resp.text().await?;
        let page: SearchResponse = serde_json::from_str(&body)?;
        Ok(page)
    }
}
