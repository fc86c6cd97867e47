//! Alternative-sourcing suggestions: lower-tariff origin countries for a
//! product category, with the saving each would unlock.
//!
//! The candidate table is configuration data, not computed. Authorization is
//! the caller's business; this module suggests for anyone who asks.

use super::entities::AlternativeSuggestion;

/// A possible origin country for a product category.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub country: &'static str,
    pub rate_percent: f64,
}

const FLAT_ROLLED_COIL: &[Candidate] = &[
    Candidate {
        country: "Vietnam",
        rate_percent: 15.0,
    },
    Candidate {
        country: "Turkey",
        rate_percent: 18.0,
    },
];

const GALVANIZED_STEEL: &[Candidate] = &[
    Candidate {
        country: "India",
        rate_percent: 12.0,
    },
    Candidate {
        country: "Brazil",
        rate_percent: 20.0,
    },
];

/// Candidates for a product category, in table order. Unmapped categories
/// get an empty slice.
pub fn alternatives_for(product_type: &str) -> &'static [Candidate] {
    match product_type {
        "Flat-rolled coil" => FLAT_ROLLED_COIL,
        "Galvanized steel" => GALVANIZED_STEEL,
        _ => &[],
    }
}

/// Candidates that strictly undercut the current rate, with the estimated
/// saving on this row's base cost. Lazy; each call restarts the sequence.
/// Savings are kept unrounded; rounding is a display concern.
pub fn suggest(
    product_type: &str,
    current_rate_percent: f64,
    base_cost: f64,
) -> impl Iterator<Item = AlternativeSuggestion> {
    alternatives_for(product_type)
        .iter()
        .filter(move |candidate| candidate.rate_percent < current_rate_percent)
        .map(move |candidate| AlternativeSuggestion {
            country: candidate.country.to_string(),
            rate_percent: candidate.rate_percent,
            estimated_savings: (current_rate_percent - candidate.rate_percent) / 100.0 * base_cost,
        })
}
