use tracing::{debug, info, warn};

use crate::text::{clean_optional, clean_text};
use crate::traits::LiveLookup;
use crate::types::{utc_date, EnrichedRecord, LookupFailure, Reply, SearchRecord, TopReply};

const PROGRESS_EVERY: usize = 100;

/// Refreshes collected records against the live API, one lookup per record.
pub struct Enricher<'a> {
    lookup: &'a dyn LiveLookup,
    keywords: &'a str,
}

impl<'a> Enricher<'a> {
    pub fn new(lookup: &'a dyn LiveLookup, keywords: &'a str) -> Self {
        Self { lookup, keywords }
    }

    /// Enrich every record in order. Never fails: lookup problems end up as
    /// [`TopReply::Unavailable`] on the affected record.
    pub async fn enrich(&self, records: Vec<SearchRecord>) -> Vec<EnrichedRecord> {
        let total = records.len();
        let mut enriched = Vec::with_capacity(total);
        let mut unavailable = 0usize;

        for (i, record) in records.into_iter().enumerate() {
            let record = self.enrich_one(record).await;
            if matches!(record.top_reply, TopReply::Unavailable(_)) {
                unavailable += 1;
            }
            enriched.push(record);

            if (i + 1) % PROGRESS_EVERY == 0 {
                info!(done = i + 1, total, "Enrichment progress");
            }
        }

        info!(total, unavailable, "Enrichment complete");
        enriched
    }

    pub async fn enrich_one(&self, record: SearchRecord) -> EnrichedRecord {
        let (score, top_reply) = match self.lookup.lookup(&record.id).await {
            Ok(live) => {
                let reply = match live.top_reply {
                    Some(reply) => TopReply::Available(Reply {
                        score: reply.score,
                        body: clean_text(&reply.body),
                    }),
                    None => {
                        log_unavailable(&record.id, &LookupFailure::NoReplies);
                        TopReply::Unavailable(LookupFailure::NoReplies)
                    }
                };
                (live.score, reply)
            }
            Err(failure) => {
                log_unavailable(&record.id, &failure);
                (record.score, TopReply::Unavailable(failure))
            }
        };

        EnrichedRecord {
            date: utc_date(record.created_utc),
            title: clean_optional(record.title.as_deref()),
            selftext: clean_optional(record.selftext.as_deref()),
            keywords: self.keywords.to_string(),
            id: record.id,
            subreddit: record.subreddit,
            full_link: record.full_link,
            score,
            num_comments: record.num_comments,
            author: record.author,
            top_reply,
        }
    }
}

fn log_unavailable(id: &str, failure: &LookupFailure) {
    if failure.is_routine() {
        debug!(id, %failure, "No top reply");
    } else {
        warn!(id, %failure, "Live lookup failed, keeping archived score");
    }
}
