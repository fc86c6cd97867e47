//! Batch orchestration: read the uploaded table, resolve and cost every row,
//! report, and write the computed table back out.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::{
    cost_breakdown, normalize_quantity, sourcing, CostedRow, LookupError, ProductRow, RateResolver,
    TariffLookup, HIGH_TARIFF_THRESHOLD,
};
use crate::infra::{
    load_reference_table, read_product_rows_from_path, write_costed_rows_to_path, TariffApiClient,
};

pub struct RunOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub tariff_table: PathBuf,
    pub api_base: String,
    pub timeout: Duration,
    /// Skip the live lookup entirely; reference table and default only.
    pub offline: bool,
    /// Privileged-caller switch: the advisor itself does no authorization,
    /// so suggestions are rendered only when the caller asked for them.
    pub with_alternatives: bool,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub accepted: usize,
    pub skipped: usize,
    pub high_tariff: usize,
}

/// Stand-in lookup for offline runs; every query is "no answer".
struct OfflineLookup;

#[async_trait]
impl TariffLookup for OfflineLookup {
    async fn rate_for(&self, _code: &str) -> Result<f64, LookupError> {
        Err(LookupError::Transport("live lookup disabled".to_string()))
    }
}

pub async fn run(options: &RunOptions) -> anyhow::Result<RunSummary> {
    let reference = load_reference_table(&options.tariff_table);

    if options.offline {
        run_with(RateResolver::new(OfflineLookup, reference), options).await
    } else {
        let client = TariffApiClient::with_base_url(&options.api_base, options.timeout)
            .with_context(|| format!("building tariff client for {}", options.api_base))?;
        run_with(RateResolver::new(client, reference), options).await
    }
}

async fn run_with<L: TariffLookup>(
    resolver: RateResolver<L>,
    options: &RunOptions,
) -> anyhow::Result<RunSummary> {
    let batch = read_product_rows_from_path(&options.input)
        .with_context(|| format!("reading {}", options.input.display()))?;

    for diagnostic in &batch.skipped {
        warn!(line = diagnostic.line, reason = %diagnostic.reason, "skipping row");
    }

    let costed = process_rows(&resolver, batch.rows).await;

    let mut stdout = std::io::stdout().lock();
    render_report(&mut stdout, &costed, options.with_alternatives)
        .context("writing report to stdout")?;

    write_costed_rows_to_path(&options.output, &costed)
        .with_context(|| format!("writing {}", options.output.display()))?;

    let summary = RunSummary {
        accepted: costed.len(),
        skipped: batch.skipped.len(),
        high_tariff: costed
            .iter()
            .filter(|row| row.rate.rate_percent > HIGH_TARIFF_THRESHOLD)
            .count(),
    };

    info!(
        accepted = summary.accepted,
        skipped = summary.skipped,
        high_tariff = summary.high_tariff,
        output = %options.output.display(),
        "batch complete"
    );

    Ok(summary)
}

/// Normalize, resolve, and cost each row in upload order. Rows are
/// independent; the only shared state is the resolver's lookup cache.
pub async fn process_rows<L: TariffLookup>(
    resolver: &RateResolver<L>,
    rows: Vec<ProductRow>,
) -> Vec<CostedRow> {
    let mut costed = Vec::with_capacity(rows.len());

    for row in rows {
        let normalized_quantity_kg = normalize_quantity(row.quantity, row.unit);
        let rate = resolver
            .resolve(&row.code, &row.origin_country, row.tariff_rate_percent)
            .await;
        let costs = cost_breakdown(
            normalized_quantity_kg,
            row.unit_value,
            rate.rate_percent,
            row.shipping_cost,
        );

        if rate.rate_percent > HIGH_TARIFF_THRESHOLD {
            warn!(
                code = %row.code,
                country = %row.origin_country,
                rate = rate.rate_percent,
                "high tariff rate"
            );
        }

        costed.push(CostedRow {
            row,
            normalized_quantity_kg,
            rate,
            costs,
        });
    }

    costed
}

fn render_report<W: Write>(
    out: &mut W,
    rows: &[CostedRow],
    with_alternatives: bool,
) -> std::io::Result<()> {
    for costed in rows {
        let row = &costed.row;
        writeln!(out, "{} from {}", row.product_type, row.origin_country)?;
        writeln!(
            out,
            "  tariff rate: {}% ({})",
            costed.rate.rate_percent,
            costed.rate.source.label()
        )?;
        writeln!(
            out,
            "  base £{:.2} + tariff £{:.2} + shipping £{:.2} = landed £{:.2}",
            costed.costs.base_cost,
            costed.costs.tariff_amount,
            row.shipping_cost,
            costed.costs.landed_cost
        )?;
        if costed.rate.rate_percent > HIGH_TARIFF_THRESHOLD {
            writeln!(
                out,
                "  warning: tariff rate above {HIGH_TARIFF_THRESHOLD}%"
            )?;
        }

        if with_alternatives {
            let mut suggestions = sourcing::suggest(
                &row.product_type,
                costed.rate.rate_percent,
                costed.costs.base_cost,
            )
            .peekable();
            if suggestions.peek().is_some() {
                writeln!(out, "  alternative sources:")?;
                for suggestion in suggestions {
                    writeln!(
                        out,
                        "    - {} at {}% tariff, potential savings £{:.2}",
                        suggestion.country, suggestion.rate_percent, suggestion.estimated_savings
                    )?;
                }
            }
        }
    }

    Ok(())
}
