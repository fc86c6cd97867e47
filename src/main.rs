use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use steel_landed_cost::app::{self, RunOptions};
use steel_landed_cost::infra::{DEFAULT_BASE_URL, DEFAULT_REFERENCE_PATH};
use steel_landed_cost::logging;

/// Landed-cost estimator for steel shipments: resolves a tariff rate per row
/// (live lookup, then local reference table, then zero), computes base,
/// tariff, and landed cost, and writes the enriched table back out.
#[derive(Parser)]
#[command(name = "steel-landed-cost", version)]
struct Cli {
    /// Uploaded product list (CSV).
    input: PathBuf,

    /// Where to write the computed table.
    #[arg(short, long, default_value = "steel_landed_costs_calculated.csv")]
    output: PathBuf,

    /// Local fallback table of (HTS code, country) tariff rates.
    #[arg(long, default_value = DEFAULT_REFERENCE_PATH)]
    tariff_table: PathBuf,

    /// Base URL of the tariff lookup service.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    api_base: String,

    /// Per-request timeout for the lookup service, in seconds.
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Skip the live lookup; resolve from the local table and default only.
    #[arg(long)]
    offline: bool,

    /// Include alternative-sourcing suggestions in the report.
    #[arg(long)]
    with_alternatives: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let cli = Cli::parse();
    let options = RunOptions {
        input: cli.input,
        output: cli.output,
        tariff_table: cli.tariff_table,
        api_base: cli.api_base,
        timeout: Duration::from_secs(cli.timeout_secs),
        offline: cli.offline,
        with_alternatives: cli.with_alternatives,
    };

    app::run(&options).await?;
    Ok(())
}
