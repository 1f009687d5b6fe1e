//! Goods admission property-based and unit tests
//!
//! Comprehensive tests for:
//! - Property: Lot Code Uniqueness
//! - Property: Lot Code Format
//! - Property: Net Weight Derivation

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashSet;

use shared::validation::validate_admission_quantities;

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Generate lot code components
fn lot_code_strategy() -> impl Strategy<Value = (i32, String, i64)> {
    let year = 2020..=2030i32;
    let member_code = "[A-Z]{3,6}";
    let sequence = 1..=9999i64;
    (year, member_code, sequence)
}

/// Generate gross weights in kg (0.1 to 10000.0)
fn gross_weight_strategy() -> impl Strategy<Value = Decimal> {
    (1..=100000i64).prop_map(|n| Decimal::new(n, 1))
}

// ============================================================================
// Helper Functions (mirroring service implementations)
// ============================================================================

/// Lot code format: OFR-{year}-{member code}-{sequence}
fn generate_lot_code(year: i32, member_code: &str, sequence: i64) -> String {
    format!("OFR-{}-{}-{:04}", year, member_code, sequence)
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    /// Property: Lot Code Uniqueness
    /// Distinct (year, member, sequence) inputs produce distinct codes.
    #[test]
    fn lot_codes_unique_for_unique_inputs(
        inputs in prop::collection::vec(lot_code_strategy(), 10..100)
    ) {
        let generated: Vec<String> = inputs
            .iter()
            .map(|(year, member, seq)| generate_lot_code(*year, member, *seq))
            .collect();

        let unique_inputs: HashSet<_> = inputs.iter().collect();
        let unique_codes: HashSet<&String> = generated.iter().collect();

        if unique_inputs.len() == inputs.len() {
            prop_assert_eq!(
                unique_codes.len(),
                generated.len(),
                "All unique inputs should produce unique codes"
            );
        }
    }

    /// Property: Lot Code Format
    #[test]
    fn lot_code_format_is_stable(
        (year, member_code, sequence) in lot_code_strategy()
    ) {
        let code = generate_lot_code(year, &member_code, sequence);

        prop_assert!(code.starts_with("OFR-"));

        let parts: Vec<&str> = code.split('-').collect();
        prop_assert_eq!(parts.len(), 4);
        prop_assert_eq!(parts[0], "OFR");
        prop_assert!(parts[1].parse::<i32>().is_ok());
        prop_assert!(parts[2].len() >= 3 && parts[2].len() <= 6);
        prop_assert_eq!(parts[3].len(), 4);
    }

    /// Property: Net Weight Derivation
    /// Whenever the quantities are accepted, net + firo reconstructs gross.
    #[test]
    fn net_plus_firo_equals_gross(
        gross in gross_weight_strategy(),
        firo_tenths in 0..=100000i64
    ) {
        let firo = Decimal::new(firo_tenths, 1);
        if let Ok(net) = validate_admission_quantities(gross, firo) {
            prop_assert_eq!(net + firo, gross);
            prop_assert!(net > Decimal::ZERO);
        }
    }

    /// Property: firo beyond gross is always rejected
    #[test]
    fn excess_firo_rejected(gross in gross_weight_strategy()) {
        let firo = gross + Decimal::new(1, 1);
        prop_assert!(validate_admission_quantities(gross, firo).is_err());
    }
}

// ============================================================================
// Unit Tests: Quantity Validation
// ============================================================================

#[cfg(test)]
mod quantity_tests {
    use super::*;

    #[test]
    fn typical_intake_weighing() {
        let net = validate_admission_quantities(
            Decimal::new(12505, 2), // 125.05 kg gross
            Decimal::new(505, 2),   // 5.05 kg firo
        )
        .unwrap();
        assert_eq!(net, Decimal::from(120));
    }

    #[test]
    fn zero_firo_passes_gross_through() {
        let net = validate_admission_quantities(Decimal::from(80), Decimal::ZERO).unwrap();
        assert_eq!(net, Decimal::from(80));
    }

    #[test]
    fn rejects_non_positive_gross() {
        assert!(validate_admission_quantities(Decimal::ZERO, Decimal::ZERO).is_err());
        assert!(validate_admission_quantities(Decimal::from(-5), Decimal::ZERO).is_err());
    }

    #[test]
    fn rejects_firo_consuming_everything() {
        assert!(validate_admission_quantities(Decimal::from(10), Decimal::from(10)).is_err());
    }
}
