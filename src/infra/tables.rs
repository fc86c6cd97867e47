//! Reading the uploaded batch and writing the computed table.
//!
//! Column headers match the upload template verbatim. Validation
//! happens here, at parse time: downstream code only ever sees well-formed
//! [`ProductRow`]s. A malformed row is skipped with a diagnostic carrying its
//! line number; one bad row never sinks the batch.

use std::fs::File;
use std::io;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::{CostedRow, MassUnit, ProductRow, RowDiagnostic};

pub const OUTPUT_HEADERS: [&str; 12] = [
    "HTS Code",
    "Product Type",
    "Country of Origin",
    "Quantity",
    "Unit",
    "Unit Value (£)",
    "Shipping Cost (£)",
    "Normalized Quantity (kg)",
    "Tariff Rate (%)",
    "Base Cost (£)",
    "Tariff Amount (£)",
    "Landed Cost (£)",
];

#[derive(Debug, Error)]
pub enum TableError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Accepted rows plus the diagnostics for the ones that were not.
#[derive(Debug, Default)]
pub struct ParsedBatch {
    pub rows: Vec<ProductRow>,
    pub skipped: Vec<RowDiagnostic>,
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "HTS Code")]
    code: String,
    #[serde(rename = "Product Type")]
    product_type: String,
    #[serde(rename = "Country of Origin")]
    origin_country: String,
    #[serde(rename = "Quantity")]
    quantity: String,
    #[serde(rename = "Unit")]
    unit: String,
    #[serde(rename = "Unit Value (£)")]
    unit_value: String,
    #[serde(rename = "Shipping Cost (£)")]
    shipping_cost: String,
    /// The whole column is optional in uploads.
    #[serde(rename = "Tariff Rate (%)", default)]
    tariff_rate_percent: Option<String>,
}

pub fn read_product_rows_from_path(path: &Path) -> Result<ParsedBatch, TableError> {
    read_product_rows(File::open(path)?)
}

/// Parse an uploaded table. An empty batch is valid and yields no rows.
pub fn read_product_rows<R: io::Read>(reader: R) -> Result<ParsedBatch, TableError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let mut batch = ParsedBatch::default();
    for result in csv_reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(error) => {
                let line = error.position().map(|pos| pos.line()).unwrap_or(0);
                batch.skipped.push(RowDiagnostic {
                    line,
                    reason: format!("unreadable row: {error}"),
                });
                continue;
            }
        };
        let line = record.position().map(|pos| pos.line()).unwrap_or(0);

        let raw = match record.deserialize::<RawRecord>(Some(&headers)) {
            Ok(raw) => raw,
            Err(error) => {
                batch.skipped.push(RowDiagnostic {
                    line,
                    reason: format!("unreadable row: {error}"),
                });
                continue;
            }
        };

        match validate_row(raw) {
            Ok(row) => batch.rows.push(row),
            Err(reason) => batch.skipped.push(RowDiagnostic { line, reason }),
        }
    }

    Ok(batch)
}

fn validate_row(raw: RawRecord) -> Result<ProductRow, String> {
    let code = required_text(&raw.code, "HTS Code")?;
    let product_type = required_text(&raw.product_type, "Product Type")?;
    let origin_country = required_text(&raw.origin_country, "Country of Origin")?;

    let unit = MassUnit::parse(&raw.unit)
        .ok_or_else(|| format!("unrecognized unit {:?} (expected kg or tonnes)", raw.unit))?;

    let quantity = non_negative_number(&raw.quantity, "Quantity")?;
    let unit_value = non_negative_number(&raw.unit_value, "Unit Value (£)")?;
    let shipping_cost = non_negative_number(&raw.shipping_cost, "Shipping Cost (£)")?;

    // A blank or non-numeric tariff cell means "resolve it".
    let tariff_rate_percent = raw
        .tariff_rate_percent
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .and_then(|text| text.parse::<f64>().ok())
        .filter(|value| value.is_finite());

    Ok(ProductRow {
        code,
        product_type,
        origin_country,
        quantity,
        unit,
        unit_value,
        shipping_cost,
        tariff_rate_percent,
    })
}

fn required_text(raw: &str, column: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(format!("missing {column}"));
    }
    Ok(trimmed.to_string())
}

fn non_negative_number(raw: &str, column: &str) -> Result<f64, String> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("non-numeric {column}: {raw:?}"))?;
    if !value.is_finite() {
        return Err(format!("non-finite {column}: {raw:?}"));
    }
    if value < 0.0 {
        return Err(format!("negative {column}: {raw:?}"));
    }
    Ok(value)
}

pub fn write_costed_rows_to_path(path: &Path, rows: &[CostedRow]) -> Result<(), TableError> {
    write_costed_rows(File::create(path)?, rows)
}

/// Write the computed table, one output row per accepted input row, in input
/// order.
pub fn write_costed_rows<W: io::Write>(writer: W, rows: &[CostedRow]) -> Result<(), TableError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(OUTPUT_HEADERS)?;

    for costed in rows {
        let row = &costed.row;
        csv_writer.write_record([
            row.code.clone(),
            row.product_type.clone(),
            row.origin_country.clone(),
            format_number(row.quantity),
            row.unit.label().to_string(),
            format_number(row.unit_value),
            format_number(row.shipping_cost),
            format_number(costed.normalized_quantity_kg),
            format_number(costed.rate.rate_percent),
            format_number(costed.costs.base_cost),
            format_number(costed.costs.tariff_amount),
            format_number(costed.costs.landed_cost),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

fn format_number(value: f64) -> String {
    // Trailing ".0" on whole numbers would churn diffs against the template.
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CostBreakdown, RateSource, ResolvedRate};

    const FULL_HEADER: &str =
        "HTS Code,Product Type,Country of Origin,Quantity,Unit,Unit Value (£),Shipping Cost (£),Tariff Rate (%)\n";

    fn parse(contents: &str) -> ParsedBatch {
        read_product_rows(contents.as_bytes()).expect("batch should parse")
    }

    #[test]
    fn parses_a_complete_row() {
        let batch = parse(&format!(
            "{FULL_HEADER}7208,Flat-rolled coil,China,2,tonnes,500,300,25\n"
        ));

        assert!(batch.skipped.is_empty());
        assert_eq!(
            batch.rows,
            vec![ProductRow {
                code: "7208".into(),
                product_type: "Flat-rolled coil".into(),
                origin_country: "China".into(),
                quantity: 2.0,
                unit: MassUnit::Tonnes,
                unit_value: 500.0,
                shipping_cost: 300.0,
                tariff_rate_percent: Some(25.0),
            }]
        );
    }

    #[test]
    fn absent_tariff_column_means_resolve() {
        let batch = parse(
            "HTS Code,Product Type,Country of Origin,Quantity,Unit,Unit Value (£),Shipping Cost (£)\n\
             7208,Flat-rolled coil,China,2,tonnes,500,300\n",
        );

        assert_eq!(batch.rows.len(), 1);
        assert_eq!(batch.rows[0].tariff_rate_percent, None);
    }

    #[test]
    fn blank_or_non_numeric_tariff_cell_means_resolve() {
        let batch = parse(&format!(
            "{FULL_HEADER}7208,Flat-rolled coil,China,2,tonnes,500,300,\n\
             7210,Galvanized steel,India,40,kg,2,10,tbd\n"
        ));

        assert_eq!(batch.rows.len(), 2);
        assert_eq!(batch.rows[0].tariff_rate_percent, None);
        assert_eq!(batch.rows[1].tariff_rate_percent, None);
    }

    #[test]
    fn malformed_rows_are_skipped_with_line_numbers() {
        let batch = parse(&format!(
            "{FULL_HEADER}7208,Flat-rolled coil,China,2,tonnes,500,300,\n\
             7209,Rebar,Turkey,lots,kg,500,300,\n\
             7210,Galvanized steel,India,-3,kg,500,300,\n\
             7211,Plate,Brazil,5,pallets,500,300,\n\
             ,Plate,Brazil,5,kg,500,300,\n\
             7212,Plate,Brazil,5,kg,500,300,\n"
        ));

        assert_eq!(batch.rows.len(), 2);
        assert_eq!(batch.rows[0].code, "7208");
        assert_eq!(batch.rows[1].code, "7212");

        let lines: Vec<u64> = batch.skipped.iter().map(|diag| diag.line).collect();
        assert_eq!(lines, vec![3, 4, 5, 6]);
        assert!(batch.skipped[0].reason.contains("Quantity"));
        assert!(batch.skipped[1].reason.contains("negative"));
        assert!(batch.skipped[2].reason.contains("unrecognized unit"));
        assert!(batch.skipped[3].reason.contains("HTS Code"));
    }

    #[test]
    fn short_rows_are_diagnosed_not_fatal() {
        let batch = parse(&format!(
            "{FULL_HEADER}7208,Flat-rolled coil,China\n\
             7210,Plate,Brazil,5,kg,500,300,\n"
        ));

        assert_eq!(batch.rows.len(), 1);
        assert_eq!(batch.rows[0].code, "7210");
        assert_eq!(batch.skipped.len(), 1);
        assert_eq!(batch.skipped[0].line, 2);
    }

    #[test]
    fn empty_batch_is_valid() {
        let batch = parse(FULL_HEADER);
        assert!(batch.rows.is_empty());
        assert!(batch.skipped.is_empty());
    }

    #[test]
    fn output_carries_input_and_computed_columns() {
        let costed = CostedRow {
            row: ProductRow {
                code: "7208".into(),
                product_type: "Flat-rolled coil".into(),
                origin_country: "China".into(),
                quantity: 2.0,
                unit: MassUnit::Tonnes,
                unit_value: 500.0,
                shipping_cost: 300.0,
                tariff_rate_percent: None,
            },
            normalized_quantity_kg: 2000.0,
            rate: ResolvedRate {
                rate_percent: 25.0,
                source: RateSource::ReferenceTable,
            },
            costs: CostBreakdown {
                base_cost: 1_000_000.0,
                tariff_amount: 250_000.0,
                landed_cost: 1_250_300.0,
            },
        };

        let mut buffer = Vec::new();
        write_costed_rows(&mut buffer, std::slice::from_ref(&costed)).expect("write");
        let written = String::from_utf8(buffer).expect("utf8");

        let mut lines = written.lines();
        assert_eq!(lines.next(), Some(OUTPUT_HEADERS.join(",").as_str()));
        assert_eq!(
            lines.next(),
            Some("7208,Flat-rolled coil,China,2,tonnes,500,300,2000,25,1000000,250000,1250300")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn empty_output_is_just_the_header() {
        let mut buffer = Vec::new();
        write_costed_rows(&mut buffer, &[]).expect("write");
        let written = String::from_utf8(buffer).expect("utf8");

        assert_eq!(written.lines().count(), 1);
    }
}
