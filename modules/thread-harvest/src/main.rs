use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pushshift_client::{PushshiftClient, DEFAULT_BASE_URL, MAX_PAGE_SIZE};
use reddit_client::{RedditClient, DEFAULT_API_BASE_URL, DEFAULT_AUTH_BASE_URL};
use thread_harvest::config::{
    parse_forums, DEFAULT_KEYWORDS, DEFAULT_OUTPUT_DIR, DEFAULT_SUBREDDITS,
};
use thread_harvest::{credentials, HarvestConfig};

#[derive(Parser)]
#[command(
    name = "thread-harvest",
    about = "Export Reddit submissions matching keywords, refreshed with live scores, to CSV"
)]
struct Cli {
    /// Search terms as an OR-pattern, e.g. "bias|prejudice"
    #[arg(long, env = "HARVEST_KEYWORDS", default_value = DEFAULT_KEYWORDS)]
    keywords: String,

    /// Comma-separated subreddit names
    #[arg(long, env = "HARVEST_SUBREDDITS", default_value = DEFAULT_SUBREDDITS)]
    subreddits: String,

    /// Results per search page (at most 1000)
    #[arg(long, env = "HARVEST_PAGE_SIZE", default_value_t = MAX_PAGE_SIZE)]
    page_size: u32,

    /// Only include submissions created after this unix timestamp
    #[arg(long, env = "HARVEST_AFTER")]
    after: Option<i64>,

    /// Skip the author/subreddit frequency tables
    #[arg(long, env = "HARVEST_NO_AGGS")]
    no_aggs: bool,

    /// Directory for the CSV outputs
    #[arg(long, env = "HARVEST_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// JSON credentials file; falls back to REDDIT_* env vars when omitted
    #[arg(long, env = "REDDIT_CREDENTIALS_FILE")]
    credentials: Option<PathBuf>,

    /// Search index base URL
    #[arg(long, env = "PUSHSHIFT_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pushshift_url: String,

    /// Reddit OAuth token endpoint base URL
    #[arg(long, env = "REDDIT_AUTH_BASE_URL", default_value = DEFAULT_AUTH_BASE_URL)]
    reddit_auth_url: String,

    /// Reddit OAuth API base URL
    #[arg(long, env = "REDDIT_API_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    reddit_api_url: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("thread_harvest=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let config = HarvestConfig {
        keyword_filter: cli.keywords,
        forums: parse_forums(&cli.subreddits),
        page_size: cli.page_size,
        earliest_timestamp: cli.after,
        collect_aggregates: !cli.no_aggs,
        output_dir: cli.output_dir,
    };
    config.validate()?;
    config.log_summary();

    let creds = match &cli.credentials {
        Some(path) => credentials::from_file(path)?,
        None => credentials::from_env()?,
    };
    credentials::log_redacted(&creds);

    let reddit = RedditClient::new(creds, &cli.reddit_auth_url, &cli.reddit_api_url)
        .context("Failed to build Reddit client")?;
    reddit
        .authenticate()
        .await
        .context("Reddit authentication failed")?;
    let pushshift =
        PushshiftClient::new(&cli.pushshift_url).context("Failed to build Pushshift client")?;

    let stats = thread_harvest::run(&config, &pushshift, &reddit).await?;
    info!("Harvest complete. {stats}");

    Ok(())
}
