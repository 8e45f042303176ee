// Write-time resolution of monetary inputs into the persisted triple:
// native amount, the conversion rate it was resolved with, and the
// base-currency equivalent.
//
// Stored and custom rates must never blend, and base-currency inputs carry
// no rate at all. Records keep these values forever, so resolution has to
// be deterministic and total.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use spendbase::core::money::{resolve, MonetaryAmount, RateType};
use spendbase::core::{AppError, CurrencyCode, RateTable};

fn code(s: &str) -> CurrencyCode {
    CurrencyCode::new(s).unwrap()
}

fn table() -> RateTable {
    RateTable::with_rates(code("USD"), vec![(code("EUR"), dec!(0.90))]).unwrap()
}

/// The default path uses the organization's stored rate: 90 EUR at 0.90
/// per USD resolves to a base amount of 100.
#[test]
fn test_default_resolution_uses_stored_rate() {
    let input = MonetaryAmount::new(dec!(90), code("EUR"));
    let resolved = resolve(&input, RateType::Default, None, &table()).unwrap();

    assert_eq!(resolved.amount, dec!(90));
    assert_eq!(resolved.currency, code("EUR"));
    assert_eq!(resolved.rate_type, RateType::Default);
    assert_eq!(resolved.conversion_rate, Some(dec!(0.90)));
    assert_eq!(resolved.base_amount, dec!(100));
}

/// A custom rate wins over the stored one and is persisted verbatim.
#[test]
fn test_custom_rate_is_pinned_verbatim() {
    let input = MonetaryAmount::new(dec!(100), code("EUR"));
    let resolved = resolve(&input, RateType::Custom, Some(dec!(0.80)), &table()).unwrap();

    assert_eq!(resolved.conversion_rate, Some(dec!(0.80)));
    assert_eq!(resolved.base_amount, dec!(125));
    assert_eq!(resolved.rate_type, RateType::Custom);
}

/// Base-currency inputs pass through: no rate, base amount equals the
/// native amount.
#[test]
fn test_base_currency_input_carries_no_rate() {
    let input = MonetaryAmount::new(dec!(250), code("USD"));
    let resolved = resolve(&input, RateType::Default, None, &table()).unwrap();

    assert!(resolved.is_base());
    assert_eq!(resolved.conversion_rate, None);
    assert_eq!(resolved.base_amount, dec!(250));
}

/// Supplying a custom rate for a base-currency amount is a contradiction
/// and is rejected.
#[test]
fn test_custom_rate_on_base_currency_rejected() {
    let input = MonetaryAmount::new(dec!(250), code("USD"));
    let err = resolve(&input, RateType::Custom, Some(dec!(1.1)), &table()).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

/// Default resolution with no stored rate fails rather than assuming 1.
#[test]
fn test_default_without_stored_rate_fails() {
    let input = MonetaryAmount::new(dec!(10), code("GBP"));
    let err = resolve(&input, RateType::Default, None, &table()).unwrap_err();
    assert!(matches!(err, AppError::RateNotFound(_)));
}

/// Rate type and supplied rate must agree: custom without a rate and
/// default with a stray rate are both rejected.
#[test]
fn test_rate_type_and_rate_must_agree() {
    let input = MonetaryAmount::new(dec!(10), code("EUR"));

    let err = resolve(&input, RateType::Custom, None, &table()).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = resolve(&input, RateType::Default, Some(dec!(0.85)), &table()).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

/// Zero and negative custom rates can never convert.
#[test]
fn test_non_positive_custom_rate_rejected() {
    let input = MonetaryAmount::new(dec!(10), code("EUR"));

    for rate in [Decimal::ZERO, dec!(-0.5)] {
        let err = resolve(&input, RateType::Custom, Some(rate), &table()).unwrap_err();
        assert!(matches!(err, AppError::InvalidRate(_)));
    }
}

/// A zero amount is legal and resolves to a zero base amount.
#[test]
fn test_zero_amount_resolves() {
    let input = MonetaryAmount::new(Decimal::ZERO, code("EUR"));
    let resolved = resolve(&input, RateType::Default, None, &table()).unwrap();

    assert_eq!(resolved.base_amount, Decimal::ZERO);
    assert_eq!(resolved.conversion_rate, Some(dec!(0.90)));
}

#[test]
fn test_negative_amount_rejected() {
    let input = MonetaryAmount::new(dec!(-1), code("EUR"));
    let err = resolve(&input, RateType::Default, None, &table()).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

proptest! {
    /// For any positive custom rate, multiplying the base amount back by
    /// the persisted rate recovers the native amount within tolerance, and
    /// the native amount itself is stored unchanged.
    #[test]
    fn prop_resolution_is_consistent_with_its_stored_rate(
        amount_cents in 0u64..10_000_000u64,
        rate_ten_thousandths in 1u64..10_000_000u64,
    ) {
        let amount = Decimal::from(amount_cents) / Decimal::from(100);
        let rate = Decimal::from(rate_ten_thousandths) / Decimal::from(10_000);

        let table = RateTable::new(code("USD"));
        let input = MonetaryAmount::new(amount, code("EUR"));
        let resolved = resolve(&input, RateType::Custom, Some(rate), &table).unwrap();

        prop_assert_eq!(resolved.amount, amount);
        prop_assert_eq!(resolved.conversion_rate, Some(rate));

        let recovered = resolved.base_amount * rate;
        let error = (recovered - amount).abs();
        prop_assert!(
            error < dec!(0.000001),
            "base amount {} at rate {} recovered {} instead of {}",
            resolved.base_amount, rate, recovered, amount
        );
    }

    /// Base-currency inputs never gain a conversion rate, whatever the
    /// amount.
    #[test]
    fn prop_base_inputs_stay_rateless(amount_cents in 0u64..10_000_000u64) {
        let amount = Decimal::from(amount_cents) / Decimal::from(100);
        let input = MonetaryAmount::new(amount, code("USD"));
        let resolved = resolve(&input, RateType::Default, None, &table()).unwrap();

        prop_assert!(resolved.is_base());
        prop_assert_eq!(resolved.base_amount, amount);
    }
}
