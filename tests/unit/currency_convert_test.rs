// Conversion-table tests: every cross-currency amount routes through the
// organization's base currency, with one stored rate per non-base currency.
//
// Covers the two-leg path between non-base currencies, identity conversion,
// rejection of missing and non-positive rates, and round-trip stability of
// the Decimal arithmetic.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use spendbase::core::{AppError, CurrencyCode, RateTable};

fn code(s: &str) -> CurrencyCode {
    CurrencyCode::new(s).unwrap()
}

fn table() -> RateTable {
    RateTable::with_rates(
        code("USD"),
        vec![(code("EUR"), dec!(0.90)), (code("INR"), dec!(83))],
    )
    .unwrap()
}

/// 90 EUR becomes 100 USD in the base leg and 8300 INR in the outbound leg.
#[test]
fn test_two_leg_conversion_routes_through_base() {
    let table = table();

    assert_eq!(
        table.convert(dec!(90), &code("EUR"), &code("INR")).unwrap(),
        dec!(8300)
    );
    // The reverse trip lands back on the original amount
    assert_eq!(
        table.convert(dec!(8300), &code("INR"), &code("EUR")).unwrap(),
        dec!(90)
    );
}

/// Same-currency conversion is the identity and never consults the table,
/// even for a currency with no stored rate.
#[test]
fn test_identity_conversion_needs_no_rate() {
    let table = RateTable::new(code("USD"));
    let jpy = code("JPY");

    assert_eq!(table.convert(dec!(4200), &jpy, &jpy).unwrap(), dec!(4200));
}

/// The base currency has an implicit rate of one in both directions.
#[test]
fn test_base_currency_legs_are_pass_through() {
    let table = table();

    assert_eq!(table.to_base(dec!(17.50), &code("USD")).unwrap(), dec!(17.50));
    assert_eq!(table.from_base(dec!(17.50), &code("USD")).unwrap(), dec!(17.50));
}

/// A currency without a stored rate fails loudly instead of converting as 1.
#[test]
fn test_missing_rate_fails_in_both_directions() {
    let table = table();
    let gbp = code("GBP");

    assert!(matches!(
        table.to_base(dec!(10), &gbp).unwrap_err(),
        AppError::RateNotFound(_)
    ));
    assert!(matches!(
        table.from_base(dec!(10), &gbp).unwrap_err(),
        AppError::RateNotFound(_)
    ));
    assert!(matches!(
        table.convert(dec!(10), &gbp, &code("EUR")).unwrap_err(),
        AppError::RateNotFound(_)
    ));
}

/// Zero and negative rates are rejected at insert time, and the base
/// currency cannot be given an explicit rate.
#[test]
fn test_insert_validates_rates() {
    let mut table = RateTable::new(code("USD"));

    assert!(matches!(
        table.insert(code("EUR"), Decimal::ZERO),
        Err(AppError::InvalidRate(_))
    ));
    assert!(matches!(
        table.insert(code("EUR"), dec!(-0.5)),
        Err(AppError::InvalidRate(_))
    ));
    assert!(matches!(
        table.insert(code("USD"), dec!(2)),
        Err(AppError::Validation(_))
    ));
    assert!(!table.supports(&code("EUR")));
}

/// Re-inserting a currency replaces its rate; subsequent conversions use
/// the new value.
#[test]
fn test_insert_replaces_existing_rate() {
    let mut table = table();
    table.insert(code("EUR"), dec!(0.95)).unwrap();

    assert_eq!(table.rate_for(&code("EUR")), Some(dec!(0.95)));
    assert_eq!(table.to_base(dec!(95), &code("EUR")).unwrap(), dec!(100));
}

#[test]
fn test_supports_covers_base_and_stored_currencies() {
    let table = table();

    assert!(table.supports(&code("USD")));
    assert!(table.supports(&code("EUR")));
    assert!(table.supports(&code("INR")));
    assert!(!table.supports(&code("GBP")));
}

proptest! {
    /// Converting out of the base and straight back is exact: the
    /// multiplication happens first, so the division terminates.
    #[test]
    fn prop_from_base_then_to_base_is_exact(
        amount_cents in 1u64..10_000_000u64,
        rate_ten_thousandths in 1u64..10_000_000u64,
    ) {
        let amount = Decimal::from(amount_cents) / Decimal::from(100);
        let rate = Decimal::from(rate_ten_thousandths) / Decimal::from(10_000);

        let table = RateTable::with_rates(code("USD"), vec![(code("EUR"), rate)]).unwrap();

        let foreign = table.from_base(amount, &code("EUR")).unwrap();
        let back = table.to_base(foreign, &code("EUR")).unwrap();

        prop_assert_eq!(back, amount);
    }

    /// The opposite trip divides first and may truncate deep decimals; the
    /// round-trip error must still be far below a cent.
    #[test]
    fn prop_to_base_then_from_base_round_trips_within_tolerance(
        amount_cents in 1u64..10_000_000u64,
        rate_ten_thousandths in 1u64..10_000_000u64,
    ) {
        let amount = Decimal::from(amount_cents) / Decimal::from(100);
        let rate = Decimal::from(rate_ten_thousandths) / Decimal::from(10_000);

        let table = RateTable::with_rates(code("USD"), vec![(code("EUR"), rate)]).unwrap();

        let in_base = table.to_base(amount, &code("EUR")).unwrap();
        let back = table.from_base(in_base, &code("EUR")).unwrap();

        let error = (back - amount).abs();
        prop_assert!(
            error < dec!(0.000001),
            "round trip drifted by {} for amount {} at rate {}",
            error, amount, rate
        );
    }

    /// Conversion preserves sign and zero for every stored rate.
    #[test]
    fn prop_conversion_preserves_sign(
        amount_cents in 0u64..10_000_000u64,
        rate_ten_thousandths in 1u64..10_000_000u64,
    ) {
        let amount = Decimal::from(amount_cents) / Decimal::from(100);
        let rate = Decimal::from(rate_ten_thousandths) / Decimal::from(10_000);

        let table = RateTable::with_rates(code("USD"), vec![(code("EUR"), rate)]).unwrap();
        let converted = table.convert(amount, &code("EUR"), &code("USD")).unwrap();

        prop_assert_eq!(converted.is_zero(), amount.is_zero());
        prop_assert!(converted >= Decimal::ZERO);
    }
}
