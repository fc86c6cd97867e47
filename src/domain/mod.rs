//! Domain logic for landed-cost estimation lives here.

pub mod costing;
pub mod entities;
pub mod resolution;
pub mod sourcing;

pub use costing::{cost_breakdown, normalize_quantity, HIGH_TARIFF_THRESHOLD};
pub use entities::{
    AlternativeSuggestion, CostBreakdown, CostedRow, HtsCode, MassUnit, ProductRow, RateSource,
    ReferenceEntry, ReferenceTable, ResolvedRate, RowDiagnostic,
};
pub use resolution::{LookupError, RateResolver, TariffLookup};
pub use sourcing::{alternatives_for, suggest};
