use std::collections::BTreeSet;
use std::path::PathBuf;

use pushshift_client::MAX_PAGE_SIZE;

use crate::error::HarvestError;

pub const DEFAULT_KEYWORDS: &str = "bias|prejudice";
pub const DEFAULT_SUBREDDITS: &str = "AskSocialScience,AskFeminists";
pub const DEFAULT_OUTPUT_DIR: &str = "./scraped_files";

/// Everything a run needs besides credentials and endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestConfig {
    /// OR-pattern over search terms, e.g. `bias|prejudice`.
    pub keyword_filter: String,
    pub forums: BTreeSet<String>,
    pub page_size: u32,
    /// Only collect submissions created after this unix timestamp.
    pub earliest_timestamp: Option<i64>,
    /// Request author/subreddit frequency tables with the first page.
    pub collect_aggregates: bool,
    pub output_dir: PathBuf,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            keyword_filter: DEFAULT_KEYWORDS.to_string(),
            forums: parse_forums(DEFAULT_SUBREDDITS),
            page_size: MAX_PAGE_SIZE,
            earliest_timestamp: None,
            collect_aggregates: true,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl HarvestConfig {
    pub fn validate(&self) -> Result<(), HarvestError> {
        if self.keyword_filter.trim().is_empty() {
            return Err(HarvestError::Config("keyword filter is empty".to_string()));
        }
        if self.forums.is_empty() {
            return Err(HarvestError::Config("no subreddits configured".to_string()));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(HarvestError::Config(format!(
                "page size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.page_size
            )));
        }
        Ok(())
    }

    pub fn log_summary(&self) {
        tracing::info!(
            keywords = %self.keyword_filter,
            subreddits = ?self.forums,
            page_size = self.page_size,
            after = ?self.earliest_timestamp,
            aggregates = self.collect_aggregates,
            output_dir = %self.output_dir.display(),
            "Harvest config"
        );
    }
}

/// Split a comma list of subreddit names, dropping blanks and duplicates.
pub fn parse_forums(list: &str) -> BTreeSet<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
