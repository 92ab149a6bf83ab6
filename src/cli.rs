use clap::{Parser, Subcommand};

use crate::commands;
use crate::commands::summary::{parse_agg, parse_metric, SummaryOptions};
use crate::constants::DEFAULT_TOP_N;
use crate::models::{Metric, OthersAggregation};
use crate::utils::get_port;

#[derive(Parser)]
#[command(name = "coinperf")]
#[command(about = "Concurrent paginated fetch and Top-N performance summaries", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch all pages and print the precomputed Top-N series as JSON
    Summary {
        /// Ranked entries per series before the "Others" rollup
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top: usize,

        /// Only compute one aggregation mode (sumPositive, sumAll, mean)
        #[arg(long, value_parser = parse_agg)]
        agg: Option<OthersAggregation>,

        /// Only output one metric (perf_24h, perf_7d, perf_30d, perf_90d)
        #[arg(long, value_parser = parse_metric)]
        metric: Option<Metric>,

        /// Fetch pages from a running server instead of the in-process simulation
        #[arg(long)]
        source_url: Option<String>,

        /// Items per page (overrides FETCH_PAGE_SIZE)
        #[arg(long)]
        page_size: Option<u32>,

        /// Concurrent page workers (overrides FETCH_CONCURRENCY)
        #[arg(long)]
        concurrency: Option<usize>,

        /// Retries per page (overrides FETCH_MAX_RETRIES)
        #[arg(long)]
        max_retries: Option<u32>,

        /// Base backoff delay in ms (overrides FETCH_BASE_DELAY_MS)
        #[arg(long)]
        base_delay_ms: Option<u64>,

        /// Per-worker pause after each page in ms (overrides FETCH_THROTTLE_MS)
        #[arg(long)]
        throttle_ms: Option<u64>,

        /// Reassemble records in page order
        #[arg(long)]
        keep_order: bool,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Start the server
    Serve {
        /// Port to listen on (default: PORT env or 8080)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

impl Commands {
    fn into_summary_options(self) -> Option<SummaryOptions> {
        match self {
            Commands::Summary {
                top,
                agg,
                metric,
                source_url,
                page_size,
                concurrency,
                max_retries,
                base_delay_ms,
                throttle_ms,
                keep_order,
                pretty,
            } => Some(SummaryOptions {
                top,
                agg,
                metric,
                source_url,
                page_size,
                concurrency,
                max_retries,
                base_delay_ms,
                throttle_ms,
                keep_order,
                pretty,
            }),
            Commands::Serve { .. } => None,
        }
    }
}

pub async fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            commands::serve::run(port.unwrap_or_else(get_port)).await;
        }
        summary => {
            if let Some(options) = summary.into_summary_options() {
                commands::summary::run(options).await;
            }
        }
    }
}
