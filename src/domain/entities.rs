use serde::{Deserialize, Serialize};

/// Commodity codes are HTS codes; the lookup service keys on them verbatim.
pub type HtsCode = String;

/// Mass unit a shipment quantity was declared in.
///
/// Parsed case-insensitively from the upload; anything else is rejected at
/// parse time rather than silently treated as kilograms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MassUnit {
    Kilograms,
    Tonnes,
}

impl MassUnit {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "kg" | "kilogram" | "kilograms" => Some(Self::Kilograms),
            "t" | "tonne" | "tonnes" => Some(Self::Tonnes),
            _ => None,
        }
    }

    /// Canonical label used when echoing the unit back into the output table.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Kilograms => "kg",
            Self::Tonnes => "tonnes",
        }
    }
}

/// One shipment line from the uploaded table, validated at parse time.
///
/// Invariants (enforced by `infra::tables`): quantity, unit value, and
/// shipping cost are finite and non-negative; an explicit tariff rate, when
/// present, is finite.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductRow {
    pub code: HtsCode,
    pub product_type: String,
    pub origin_country: String,
    pub quantity: f64,
    pub unit: MassUnit,
    /// Value per kilogram, in pounds.
    pub unit_value: f64,
    pub shipping_cost: f64,
    /// Pre-supplied rate; `None` means "resolve it".
    pub tariff_rate_percent: Option<f64>,
}

/// Where a resolved tariff rate came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateSource {
    /// The row already carried a rate; resolution was skipped.
    Explicit,
    /// The live lookup service answered (possibly from the per-process cache).
    LiveLookup,
    /// Exact match in the local reference table.
    ReferenceTable,
    /// Nothing answered; rate is zero.
    Default,
}

impl RateSource {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::LiveLookup => "live lookup",
            Self::ReferenceTable => "reference table",
            Self::Default => "default",
        }
    }
}

/// A tariff rate paired with its provenance. Immutable once produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedRate {
    pub rate_percent: f64,
    pub source: RateSource,
}

/// One row of the local fallback table.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ReferenceEntry {
    #[serde(rename = "HTS Code")]
    pub code: HtsCode,
    #[serde(rename = "Country of Origin")]
    pub country: String,
    #[serde(rename = "Tariff Rate (%)")]
    pub rate_percent: f64,
}

/// In-memory fallback table, loaded once at startup and read-only after.
#[derive(Clone, Debug, Default)]
pub struct ReferenceTable {
    entries: Vec<ReferenceEntry>,
}

impl ReferenceTable {
    pub fn new(entries: Vec<ReferenceEntry>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Exact match on code, case-insensitive match on country.
    pub fn rate_for(&self, code: &str, country: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|entry| entry.code == code && entry.country.eq_ignore_ascii_case(country))
            .map(|entry| entry.rate_percent)
    }
}

/// Cost components for one row. `landed_cost` is always
/// `base_cost + tariff_amount + shipping_cost`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CostBreakdown {
    pub base_cost: f64,
    pub tariff_amount: f64,
    pub landed_cost: f64,
}

/// Output-table record: the input row joined with everything derived from it.
#[derive(Clone, Debug, PartialEq)]
pub struct CostedRow {
    pub row: ProductRow,
    pub normalized_quantity_kg: f64,
    pub rate: ResolvedRate,
    pub costs: CostBreakdown,
}

/// A lower-tariff sourcing candidate with its estimated saving. Ephemeral,
/// produced for display only.
#[derive(Clone, Debug, PartialEq)]
pub struct AlternativeSuggestion {
    pub country: String,
    pub rate_percent: f64,
    pub estimated_savings: f64,
}

/// A row rejected at parse time, with enough context to report it.
#[derive(Clone, Debug, PartialEq)]
pub struct RowDiagnostic {
    /// 1-based line number in the uploaded file (header is line 1).
    pub line: u64,
    pub reason: String,
}
