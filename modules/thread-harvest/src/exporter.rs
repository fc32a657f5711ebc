use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::HarvestError;
use crate::types::{AggregateBucket, Aggregates, EnrichedRecord, NOT_AVAILABLE};

pub const OVERVIEW_FILE: &str = "reddit_overview.csv";
pub const AUTHOR_SUMMARY_FILE: &str = "author_summary.csv";
pub const SUBREDDIT_SUMMARY_FILE: &str = "subreddit_summary.csv";

pub const OVERVIEW_COLUMNS: [&str; 12] = [
    "full_link",
    "subreddit",
    "post keywords",
    "id",
    "date",
    "score",
    "num_comments",
    "author",
    "title",
    "selftext",
    "top_comment",
    "comment_score",
];

/// One overview row, fields in [`OVERVIEW_COLUMNS`] order.
#[derive(Debug, Serialize)]
struct OverviewRow<'a> {
    full_link: &'a str,
    subreddit: &'a str,
    keywords: &'a str,
    id: &'a str,
    date: String,
    score: i64,
    num_comments: i64,
    author: &'a str,
    title: &'a str,
    selftext: &'a str,
    top_comment: &'a str,
    comment_score: String,
}

impl<'a> From<&'a EnrichedRecord> for OverviewRow<'a> {
    fn from(r: &'a EnrichedRecord) -> Self {
        Self {
            full_link: &r.full_link,
            subreddit: &r.subreddit,
            keywords: &r.keywords,
            id: &r.id,
            date: r
                .date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            score: r.score,
            num_comments: r.num_comments,
            author: &r.author,
            title: &r.title,
            selftext: &r.selftext,
            top_comment: r.top_reply.body_field(),
            comment_score: r.top_reply.score_field(),
        }
    }
}

/// Paths written by a single export.
#[derive(Debug, Clone, Default)]
pub struct ExportSummary {
    pub overview: PathBuf,
    pub author_summary: Option<PathBuf>,
    pub subreddit_summary: Option<PathBuf>,
    pub rows: usize,
}

/// Sort records for the overview table. Stable, so exact ties keep collection order.
pub fn sort_overview(records: &mut [EnrichedRecord]) {
    records.sort_by(EnrichedRecord::overview_order);
}

/// Writes the CSV outputs into one directory, replacing existing files.
pub struct Exporter {
    output_dir: PathBuf,
}

impl Exporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Sort and write the overview, plus the frequency tables when `aggregates` is present.
    pub fn export(
        &self,
        mut records: Vec<EnrichedRecord>,
        aggregates: Option<&Aggregates>,
    ) -> Result<ExportSummary, HarvestError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|e| HarvestError::Export {
            path: self.output_dir.clone(),
            message: e.to_string(),
        })?;

        sort_overview(&mut records);
        let overview = self.output_dir.join(OVERVIEW_FILE);
        write_overview(&overview, &records)?;

        let mut summary = ExportSummary {
            overview,
            rows: records.len(),
            ..ExportSummary::default()
        };

        if let Some(aggs) = aggregates {
            let authors = self.output_dir.join(AUTHOR_SUMMARY_FILE);
            write_frequency_table(&authors, "author", &aggs.authors)?;
            summary.author_summary = Some(authors);

            let subreddits = self.output_dir.join(SUBREDDIT_SUMMARY_FILE);
            write_frequency_table(&subreddits, "subreddit", &aggs.subreddits)?;
            summary.subreddit_summary = Some(subreddits);
        } else {
            // Tables from an earlier run would not describe this overview.
            remove_stale(&self.output_dir.join(AUTHOR_SUMMARY_FILE))?;
            remove_stale(&self.output_dir.join(SUBREDDIT_SUMMARY_FILE))?;
        }

        Ok(summary)
    }
}

fn remove_stale(path: &Path) -> Result<(), HarvestError> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            info!(path = %path.display(), "Removed stale frequency table");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(HarvestError::Export {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
    }
}

fn export_error(path: &Path) -> impl Fn(csv::Error) -> HarvestError + '_ {
    move |e| HarvestError::Export {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

fn writer(path: &Path) -> Result<csv::Writer<std::fs::File>, HarvestError> {
    // Headers are written explicitly so an empty table still gets its header row.
    csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(export_error(path))
}

/// Write the overview table in the order given.
pub fn write_overview(path: &Path, records: &[EnrichedRecord]) -> Result<(), HarvestError> {
    let mut wtr = writer(path)?;
    wtr.write_record(OVERVIEW_COLUMNS).map_err(export_error(path))?;
    for record in records {
        wtr.serialize(OverviewRow::from(record))
            .map_err(export_error(path))?;
    }
    wtr.flush().map_err(|e| HarvestError::Export {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    info!(path = %path.display(), rows = records.len(), "Wrote overview");
    Ok(())
}

/// Write a two-column `<key_header>,count` table.
pub fn write_frequency_table(
    path: &Path,
    key_header: &str,
    buckets: &[AggregateBucket],
) -> Result<(), HarvestError> {
    let mut wtr = writer(path)?;
    wtr.write_record([key_header, "count"])
        .map_err(export_error(path))?;
    for bucket in buckets {
        wtr.write_record([bucket.key.as_str(), bucket.count.to_string().as_str()])
            .map_err(export_error(path))?;
    }
    wtr.flush().map_err(|e| HarvestError::Export {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    info!(path = %path.display(), rows = buckets.len(), "Wrote frequency table");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::enriched_record;
    use crate::types::{LookupFailure, Reply, TopReply};

    #[test]
    fn sorts_by_score_then_reply_score() {
        let mut records = vec![
            enriched_record("a", 5, Some(1)),
            enriched_record("b", 5, Some(9)),
            enriched_record("c", 2, Some(100)),
        ];
        sort_overview(&mut records);

        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn unavailable_reply_sorts_after_numeric_reply() {
        let mut records = vec![
            enriched_record("none", 5, None),
            enriched_record("neg", 5, Some(-4)),
            enriched_record("low", 1, Some(50)),
        ];
        sort_overview(&mut records);

        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["neg", "none", "low"]);
    }

    #[test]
    fn exact_ties_keep_input_order() {
        let mut records = vec![
            enriched_record("first", 3, None),
            enriched_record("second", 3, None),
            enriched_record("third", 3, None),
        ];
        sort_overview(&mut records);

        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn overview_has_header_and_sentinels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(OVERVIEW_FILE);
        let mut record = enriched_record("abc", 12, None);
        record.title = "Commas, \"quotes\"".to_string();
        record.top_reply = TopReply::Unavailable(LookupFailure::NotFound);

        write_overview(&path, &[record]).unwrap();

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, OVERVIEW_COLUMNS);
        let row = rdr.records().next().unwrap().unwrap();
        assert_eq!(&row[3], "abc");
        assert_eq!(&row[4], "2021-01-07");
        assert_eq!(&row[8], "Commas, \"quotes\"");
        assert_eq!(&row[10], "N/A");
        assert_eq!(&row[11], "N/A");
    }

    #[test]
    fn empty_overview_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(OVERVIEW_FILE);

        write_overview(&path, &[]).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, format!("{}\n", OVERVIEW_COLUMNS.join(",")));
    }

    #[test]
    fn frequency_table_renames_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(AUTHOR_SUMMARY_FILE);
        let buckets = vec![AggregateBucket { key: "alice".to_string(), count: 3 }];

        write_frequency_table(&path, "author", &buckets).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "author,count\nalice,3\n");
    }

    #[test]
    fn export_overwrites_and_skips_aggs_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("out");
        let exporter = Exporter::new(&out);

        exporter
            .export(vec![enriched_record("old", 1, None)], None)
            .unwrap();
        let summary = exporter
            .export(vec![enriched_record("new", 2, Some(1))], None)
            .unwrap();

        assert_eq!(summary.rows, 1);
        assert!(summary.author_summary.is_none());
        assert!(!out.join(AUTHOR_SUMMARY_FILE).exists());
        let contents = std::fs::read_to_string(&summary.overview).unwrap();
        assert!(contents.contains("new"));
        assert!(!contents.contains("old"));
    }

    #[test]
    fn export_without_aggs_removes_earlier_frequency_tables() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path());
        let aggs = Aggregates {
            authors: vec![AggregateBucket { key: "alice".to_string(), count: 3 }],
            subreddits: vec![AggregateBucket { key: "AskFeminists".to_string(), count: 3 }],
        };

        exporter
            .export(vec![enriched_record("a", 1, None)], Some(&aggs))
            .unwrap();
        assert!(dir.path().join(AUTHOR_SUMMARY_FILE).exists());

        exporter
            .export(vec![enriched_record("b", 1, None)], None)
            .unwrap();

        assert!(dir.path().join(OVERVIEW_FILE).exists());
        assert!(!dir.path().join(AUTHOR_SUMMARY_FILE).exists());
        assert!(!dir.path().join(SUBREDDIT_SUMMARY_FILE).exists());
    }

    #[test]
    fn reply_body_is_written_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(OVERVIEW_FILE);
        let mut record = enriched_record("abc", 1, Some(4));
        record.top_reply = TopReply::Available(Reply { score: 4, body: "multi\nline".to_string() });

        write_overview(&path, &[record]).unwrap();

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let row = rdr.records().next().unwrap().unwrap();
        assert_eq!(&row[10], "multi\nline");
        assert_eq!(&row[11], "4");
    }
}
