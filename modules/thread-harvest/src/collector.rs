use std::collections::HashSet;

use pushshift_client::SearchQuery;
use tracing::{info, warn};

use crate::config::HarvestConfig;
use crate::error::HarvestError;
use crate::traits::SearchIndex;
use crate::types::{Aggregates, SearchRecord};

/// Everything gathered from the search index in one run.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    /// Newest first, in the order the index returned them.
    pub records: Vec<SearchRecord>,
    /// Present only when aggregates were requested.
    pub aggregates: Option<Aggregates>,
    /// Index-reported match count from the first page.
    pub total_results: Option<u64>,
    pub pages: usize,
    /// Boundary repeats dropped because their id was already collected.
    pub duplicates_dropped: usize,
}

/// Pages backwards through the search index using `before=<last created_utc>`
/// until a page comes back empty.
pub struct Collector<'a> {
    index: &'a dyn SearchIndex,
    config: &'a HarvestConfig,
}

impl<'a> Collector<'a> {
    pub fn new(index: &'a dyn SearchIndex, config: &'a HarvestConfig) -> Self {
        Self { index, config }
    }

    fn base_query(&self) -> SearchQuery {
        let query = SearchQuery::submissions(
            &self.config.keyword_filter,
            self.config.forums.iter().map(String::as_str),
            self.config.page_size,
        );
        match self.config.earliest_timestamp {
            Some(after) => query.after(after),
            None => query,
        }
    }

    pub async fn collect(&self) -> Result<Collection, HarvestError> {
        let mut collection = Collection::default();
        let mut seen: HashSet<String> = HashSet::new();
        let mut cursor: Option<i64> = None;

        loop {
            let first_page = collection.pages == 0;
            let mut query = self.base_query();
            if let Some(before) = cursor {
                query = query.before(before);
            }
            if first_page && self.config.collect_aggregates {
                query = query.with_aggs();
            }

            let page = self.index.search(&query).await?;
            collection.pages += 1;
            info!(page = collection.pages, before = ?cursor, "Search page received");

            let shards = page.metadata.shards;
            if !shards.is_complete() {
                return Err(HarvestError::IncompleteShards {
                    successful: shards.successful,
                    total: shards.total,
                });
            }

            if first_page {
                collection.total_results = page.metadata.total_results;
                info!(
                    keywords = %self.config.keyword_filter,
                    total_results = ?page.metadata.total_results,
                    "First page received"
                );
                if self.config.collect_aggregates {
                    let aggs = page.aggs.ok_or_else(|| {
                        HarvestError::MalformedResponse(
                            "aggregations requested but missing from first page".to_string(),
                        )
                    })?;
                    collection.aggregates = Some(aggs.into());
                }
            }

            let Some(last) = page.data.last() else {
                break;
            };
            let next_cursor = last.created_utc;

            for submission in page.data {
                if seen.insert(submission.id.clone()) {
                    collection.records.push(submission.into());
                } else {
                    warn!(id = %submission.id, "Dropping duplicate submission at page boundary");
                    collection.duplicates_dropped += 1;
                }
            }

            cursor = Some(next_cursor);
        }

        info!(
            records = collection.records.len(),
            pages = collection.pages,
            duplicates_dropped = collection.duplicates_dropped,
            "Collection complete"
        );
        Ok(collection)
    }
}
