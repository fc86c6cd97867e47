//! Loading the local fallback table from disk.
//!
//! An absent or unreadable file is not an error: the table is simply empty
//! and every miss falls through to the zero default downstream.

use std::path::Path;

use tracing::{info, warn};

use crate::domain::{ReferenceEntry, ReferenceTable};

pub const DEFAULT_REFERENCE_PATH: &str = "tariff_rates.csv";

/// Load the reference table, tolerating a missing or broken file.
///
/// Individual rows that fail to deserialize are skipped with a warning; the
/// rest of the file still loads.
pub fn load_reference_table(path: &Path) -> ReferenceTable {
    let mut reader = match csv::Reader::from_path(path) {
        Ok(reader) => reader,
        Err(error) => {
            warn!(path = %path.display(), %error, "reference table unavailable; using empty table");
            return ReferenceTable::default();
        }
    };

    let mut entries = Vec::new();
    for (index, record) in reader.deserialize::<ReferenceEntry>().enumerate() {
        match record {
            Ok(entry) => entries.push(entry),
            Err(error) => {
                // Header is line 1, so data row N sits on line N + 1.
                warn!(line = index + 2, %error, "skipping unreadable reference row");
            }
        }
    }

    info!(path = %path.display(), entries = entries.len(), "reference table loaded");
    ReferenceTable::new(entries)
}
