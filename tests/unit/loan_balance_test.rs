// Loan ledger arithmetic: payments only ever shrink what is owed, every
// oversized or misdirected payment is rejected before any state changes,
// and a loan is paid exactly when both balance and interest reach zero.
//
// All figures live in the loan's ledger currency; conversion happened once
// at creation and payments arrive here already converted.

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use spendbase::core::money::RateType;
use spendbase::core::{AppError, CurrencyCode};
use spendbase::modules::loans::models::{Loan, LoanStatus, PaymentType};
use spendbase::modules::loans::services::{BalanceTracker, PaymentApplication};

fn ledger_loan(
    principal: Decimal,
    balance: Decimal,
    interest: Decimal,
    status: LoanStatus,
) -> Loan {
    let now = Utc::now();
    Loan {
        id: "loan-1".to_string(),
        organization_id: "org-1".to_string(),
        account_id: Some("acc-1".to_string()),
        team_member_id: Some("tm-1".to_string()),
        original_amount: principal,
        currency: CurrencyCode::new("USD").unwrap(),
        rate_type: RateType::Default,
        conversion_rate: None,
        base_amount: Some(principal),
        ledger_currency: CurrencyCode::new("USD").unwrap(),
        principal_amount: principal,
        current_balance: balance,
        accrued_interest: interest,
        status,
        issued_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        notes: None,
        created_at: now,
        updated_at: now,
    }
}

fn settle(loan: &mut Loan, application: &PaymentApplication) {
    loan.current_balance = application.new_balance;
    loan.accrued_interest = application.new_interest;
    loan.status = application.new_status;
}

/// A loan of 100 paid off in two installments: 40 leaves it partial at 60,
/// the final 60 marks it paid, and a paid loan takes no further payments.
#[test]
fn test_repayment_lifecycle() {
    let mut loan = ledger_loan(dec!(100), dec!(100), dec!(0), LoanStatus::Active);

    let first = BalanceTracker::apply_payment(&loan, dec!(40), PaymentType::Principal).unwrap();
    assert_eq!(first.new_balance, dec!(60));
    assert_eq!(first.new_status, LoanStatus::Partial);
    settle(&mut loan, &first);

    let second = BalanceTracker::apply_payment(&loan, dec!(60), PaymentType::Principal).unwrap();
    assert_eq!(second.new_balance, dec!(0));
    assert_eq!(second.new_status, LoanStatus::Paid);
    settle(&mut loan, &second);

    let err = BalanceTracker::apply_payment(&loan, dec!(1), PaymentType::Both).unwrap_err();
    assert!(matches!(err, AppError::LoanClosed(_)));
}

/// A rejected overpayment must leave the caller's loan exactly as it was.
#[test]
fn test_rejected_overpayment_changes_nothing() {
    let loan = ledger_loan(dec!(100), dec!(60), dec!(0), LoanStatus::Partial);

    let err =
        BalanceTracker::apply_payment(&loan, dec!(60.01), PaymentType::Principal).unwrap_err();
    assert!(matches!(err, AppError::PaymentExceedsBalance(_)));

    assert_eq!(loan.current_balance, dec!(60));
    assert_eq!(loan.status, LoanStatus::Partial);
}

/// A combined payment clears accrued interest before touching principal.
#[test]
fn test_combined_payment_clears_interest_first() {
    let loan = ledger_loan(dec!(100), dec!(100), dec!(20), LoanStatus::Active);

    let applied = BalanceTracker::apply_payment(&loan, dec!(50), PaymentType::Both).unwrap();
    assert_eq!(applied.interest_portion, dec!(20));
    assert_eq!(applied.principal_portion, dec!(30));
    assert_eq!(applied.new_interest, dec!(0));
    assert_eq!(applied.new_balance, dec!(70));
    assert_eq!(applied.new_status, LoanStatus::Partial);
}

/// Clearing the balance alone is not enough: outstanding interest keeps the
/// loan partial until an interest payment zeroes it too.
#[test]
fn test_paid_requires_zero_interest_as_well() {
    let mut loan = ledger_loan(dec!(100), dec!(50), dec!(10), LoanStatus::Partial);

    let principal =
        BalanceTracker::apply_payment(&loan, dec!(50), PaymentType::Principal).unwrap();
    assert_eq!(principal.new_balance, dec!(0));
    assert_eq!(principal.new_status, LoanStatus::Partial);
    settle(&mut loan, &principal);

    let interest =
        BalanceTracker::apply_payment(&loan, dec!(10), PaymentType::Interest).unwrap();
    assert_eq!(interest.new_interest, dec!(0));
    assert_eq!(interest.new_status, LoanStatus::Paid);
}

/// Interest payments are capped at the accrued interest.
#[test]
fn test_interest_payment_cannot_exceed_accrued() {
    let loan = ledger_loan(dec!(100), dec!(100), dec!(15), LoanStatus::Active);

    let err =
        BalanceTracker::apply_payment(&loan, dec!(15.50), PaymentType::Interest).unwrap_err();
    assert!(matches!(err, AppError::PaymentExceedsBalance(_)));
}

/// Defaulted loans still accept payments; one landing moves the loan back
/// to partial.
#[test]
fn test_defaulted_loan_returns_to_partial_on_payment() {
    let loan = ledger_loan(dec!(100), dec!(80), dec!(0), LoanStatus::Defaulted);

    let applied =
        BalanceTracker::apply_payment(&loan, dec!(30), PaymentType::Principal).unwrap();
    assert_eq!(applied.new_balance, dec!(50));
    assert_eq!(applied.new_status, LoanStatus::Partial);
}

/// Cancelled loans are terminal just like paid ones.
#[test]
fn test_cancelled_loan_rejects_payments() {
    let loan = ledger_loan(dec!(100), dec!(70), dec!(0), LoanStatus::Cancelled);

    let err = BalanceTracker::apply_payment(&loan, dec!(10), PaymentType::Both).unwrap_err();
    assert!(matches!(err, AppError::LoanClosed(_)));
}

/// The entry-currency view of what remains is a ratio projection of the
/// ledger balance, anchored to the recorded conversion, not a live one.
#[test]
fn test_remaining_original_follows_ledger_ratio() {
    let mut loan = ledger_loan(dec!(100), dec!(40), dec!(0), LoanStatus::Partial);
    loan.original_amount = dec!(9000);
    loan.currency = CurrencyCode::new("INR").unwrap();
    loan.conversion_rate = Some(dec!(90));

    // 9000 * 40 / 100
    assert_eq!(loan.remaining_original(), dec!(3600));
}

/// A member's denormalized total counts active and partial loans only;
/// paid, cancelled and defaulted balances stay out.
#[test]
fn test_member_total_counts_outstanding_loans_only() {
    let loans = vec![
        ledger_loan(dec!(100), dec!(100), dec!(0), LoanStatus::Active),
        ledger_loan(dec!(100), dec!(45), dec!(0), LoanStatus::Partial),
        ledger_loan(dec!(100), dec!(0), dec!(0), LoanStatus::Paid),
        ledger_loan(dec!(100), dec!(80), dec!(0), LoanStatus::Cancelled),
        ledger_loan(dec!(100), dec!(60), dec!(0), LoanStatus::Defaulted),
    ];

    assert_eq!(BalanceTracker::recompute_member_balance(&loans), dec!(145));
}

proptest! {
    /// Whatever the payment, an accepted principal payment never increases
    /// the balance and never drives it negative; anything larger than the
    /// balance is rejected.
    #[test]
    fn prop_balance_never_increases_and_never_goes_negative(
        balance_cents in 1u64..1_000_000u64,
        payment_cents in 1u64..1_000_000u64,
    ) {
        let balance = Decimal::from(balance_cents) / Decimal::from(100);
        let payment = Decimal::from(payment_cents) / Decimal::from(100);
        let loan = ledger_loan(balance, balance, dec!(0), LoanStatus::Active);

        match BalanceTracker::apply_payment(&loan, payment, PaymentType::Principal) {
            Ok(applied) => {
                prop_assert!(payment <= balance);
                prop_assert!(applied.new_balance >= Decimal::ZERO);
                prop_assert!(applied.new_balance <= balance);
                prop_assert_eq!(applied.new_balance, balance - payment);
            }
            Err(err) => {
                prop_assert!(payment > balance);
                prop_assert!(matches!(err, AppError::PaymentExceedsBalance(_)));
            }
        }
    }

    /// For combined payments the two portions always sum to the applied
    /// amount, total owed drops by exactly that amount, and the paid state
    /// coincides with nothing left owing.
    #[test]
    fn prop_combined_portions_account_for_every_cent(
        balance_cents in 0u64..1_000_000u64,
        interest_cents in 0u64..100_000u64,
        payment_cents in 1u64..1_100_000u64,
    ) {
        let balance = Decimal::from(balance_cents) / Decimal::from(100);
        let interest = Decimal::from(interest_cents) / Decimal::from(100);
        let payment = Decimal::from(payment_cents) / Decimal::from(100);
        prop_assume!(payment <= balance + interest);

        let loan = ledger_loan(balance.max(dec!(1)), balance, interest, LoanStatus::Active);
        let applied = BalanceTracker::apply_payment(&loan, payment, PaymentType::Both).unwrap();

        prop_assert_eq!(
            applied.principal_portion + applied.interest_portion,
            payment
        );
        prop_assert_eq!(
            applied.new_balance + applied.new_interest,
            balance + interest - payment
        );
        prop_assert_eq!(
            applied.new_status == LoanStatus::Paid,
            applied.new_balance.is_zero() && applied.new_interest.is_zero()
        );
    }
}
