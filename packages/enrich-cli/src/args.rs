use clap::Parser;
use owner_enrichment::EnrichmentConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Default pause after each page fetch.
pub const DEFAULT_FETCH_DELAY_MS: u64 = 500;

/// Find contact emails for the people who own the properties in a CSV file.
#[derive(Debug, Parser)]
#[command(name = "enrich", version, about)]
pub struct Args {
    /// Input CSV with one property record per row
    #[arg(long, short)]
    pub input: PathBuf,

    /// Output CSV of discovered emails
    #[arg(long, short)]
    pub output: PathBuf,

    /// Processed-ID checkpoint file
    #[arg(
        long,
        env = "ENRICH_CHECKPOINT",
        default_value = owner_enrichment::stores::file::DEFAULT_CHECKPOINT_PATH
    )]
    pub checkpoint: PathBuf,

    /// Ignore and do not write the checkpoint
    #[arg(long)]
    pub no_checkpoint: bool,

    /// Only look at search snippets, never fetch result pages
    #[arg(long)]
    pub no_scrape: bool,

    /// Search attempts per owner name
    #[arg(long)]
    pub max_queries: Option<usize>,

    /// Emails to collect per owner name
    #[arg(long)]
    pub max_emails: Option<usize>,

    /// Hits requested per search
    #[arg(long)]
    pub results_per_query: Option<usize>,

    /// Page fetch timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub fetch_timeout: Option<u64>,

    /// Owner names searched concurrently within one record
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Cap on search requests per second
    #[arg(long)]
    pub search_rps: Option<u32>,

    /// Pause after each page fetch, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_FETCH_DELAY_MS)]
    pub fetch_delay_ms: u64,
}

impl Args {
    /// Run configuration: defaults overridden by any flags given.
    pub fn enrichment_config(&self) -> EnrichmentConfig {
        let mut config = EnrichmentConfig::default().with_scrape_pages(!self.no_scrape);
        if let Some(n) = self.max_queries {
            config = config.with_max_queries(n);
        }
        if let Some(n) = self.max_emails {
            config = config.with_max_emails_per_name(n);
        }
        if let Some(n) = self.results_per_query {
            config = config.with_results_per_query(n);
        }
        if let Some(secs) = self.fetch_timeout {
            config = config.with_fetch_timeout(Duration::from_secs(secs));
        }
        if let Some(n) = self.concurrency {
            config = config.with_name_concurrency(n);
        }
        config
    }

    pub fn fetch_delay(&self) -> Duration {
        Duration::from_millis(self.fetch_delay_ms)
    }
}
