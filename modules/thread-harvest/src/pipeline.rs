use std::time::Instant;

use tracing::info;

use crate::collector::Collector;
use crate::config::HarvestConfig;
use crate::enricher::Enricher;
use crate::error::HarvestError;
use crate::exporter::{ExportSummary, Exporter};
use crate::traits::{LiveLookup, SearchIndex};

/// Outcome of a complete run.
#[derive(Debug, Clone)]
pub struct RunStats {
    pub pages: usize,
    pub records: usize,
    pub total_results: Option<u64>,
    pub duplicates_dropped: usize,
    pub replies_unavailable: usize,
    pub export: ExportSummary,
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} records from {} pages ({} without top comment) -> {}",
            self.records,
            self.pages,
            self.replies_unavailable,
            self.export.overview.display()
        )
    }
}

/// Collect, enrich, export. Nothing is written unless collection finishes cleanly.
pub async fn run(
    config: &HarvestConfig,
    index: &dyn SearchIndex,
    lookup: &dyn LiveLookup,
) -> Result<RunStats, HarvestError> {
    config.validate()?;
    let started = Instant::now();

    let collection = Collector::new(index, config).collect().await?;
    info!(
        records = collection.records.len(),
        elapsed_secs = started.elapsed().as_secs(),
        "Successful data collection"
    );

    let enriched = Enricher::new(lookup, &config.keyword_filter)
        .enrich(collection.records)
        .await;
    let replies_unavailable = enriched
        .iter()
        .filter(|r| r.top_reply.score().is_none())
        .count();

    let records = enriched.len();
    let export =
        Exporter::new(&config.output_dir).export(enriched, collection.aggregates.as_ref())?;

    info!(elapsed_secs = started.elapsed().as_secs_f64(), "Run finished");

    Ok(RunStats {
        pages: collection.pages,
        records,
        total_results: collection.total_results,
        duplicates_dropped: collection.duplicates_dropped,
        replies_unavailable,
        export,
    })
}
