//! Quantity normalization and the landed-cost arithmetic.
//!
//! Both functions are pure; all rounding happens at display time.

use super::entities::{CostBreakdown, MassUnit};

/// Tariff rates above this are flagged in the report.
pub const HIGH_TARIFF_THRESHOLD: f64 = 20.0;

/// Convert a declared quantity into kilograms.
pub fn normalize_quantity(quantity: f64, unit: MassUnit) -> f64 {
    match unit {
        MassUnit::Kilograms => quantity,
        MassUnit::Tonnes => quantity * 1000.0,
    }
}

/// Base, tariff, and landed cost for one row.
///
/// A zero rate is a valid input, not an error; the breakdown then carries a
/// zero tariff amount and `landed = base + shipping`.
pub fn cost_breakdown(
    normalized_kg: f64,
    unit_value: f64,
    rate_percent: f64,
    shipping_cost: f64,
) -> CostBreakdown {
    let base_cost = normalized_kg * unit_value;
    let tariff_amount = rate_percent / 100.0 * base_cost;
    CostBreakdown {
        base_cost,
        tariff_amount,
        landed_cost: base_cost + tariff_amount + shipping_cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tonnes_scale_by_a_thousand() {
        assert_eq!(normalize_quantity(2.0, MassUnit::Tonnes), 2000.0);
        assert_eq!(normalize_quantity(0.5, MassUnit::Tonnes), 500.0);
        assert_eq!(normalize_quantity(0.0, MassUnit::Tonnes), 0.0);
    }

    #[test]
    fn kilograms_pass_through() {
        assert_eq!(normalize_quantity(125.0, MassUnit::Kilograms), 125.0);
        assert_eq!(normalize_quantity(0.0, MassUnit::Kilograms), 0.0);
    }

    #[test]
    fn unit_parsing_is_case_insensitive() {
        assert_eq!(MassUnit::parse("KG"), Some(MassUnit::Kilograms));
        assert_eq!(MassUnit::parse(" Tonnes "), Some(MassUnit::Tonnes));
        assert_eq!(MassUnit::parse("tonne"), Some(MassUnit::Tonnes));
        assert_eq!(MassUnit::parse("lbs"), None);
        assert_eq!(MassUnit::parse(""), None);
    }

    #[test]
    fn breakdown_identity_holds() {
        let costs = cost_breakdown(2000.0, 500.0, 25.0, 300.0);
        assert_eq!(costs.base_cost, 1_000_000.0);
        assert_eq!(costs.tariff_amount, 250_000.0);
        assert_eq!(costs.landed_cost, 1_250_300.0);
        assert_eq!(
            costs.landed_cost,
            costs.base_cost + costs.tariff_amount + 300.0
        );
    }

    #[test]
    fn zero_rate_is_valid() {
        let costs = cost_breakdown(2000.0, 500.0, 0.0, 300.0);
        assert_eq!(costs.base_cost, 1_000_000.0);
        assert_eq!(costs.tariff_amount, 0.0);
        assert_eq!(costs.landed_cost, 1_000_300.0);
    }

    #[test]
    fn empty_shipment_costs_only_shipping() {
        let costs = cost_breakdown(0.0, 500.0, 25.0, 42.0);
        assert_eq!(costs.base_cost, 0.0);
        assert_eq!(costs.tariff_amount, 0.0);
        assert_eq!(costs.landed_cost, 42.0);
    }
}
