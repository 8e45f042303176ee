use rust_decimal::Decimal;

use crate::core::{AppError, Result};
use crate::modules::loans::models::{Loan, LoanStatus, PaymentType};

/// Outcome of applying one payment, computed before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentApplication {
    /// Payment expressed in the loan's ledger currency
    pub applied_amount: Decimal,
    pub principal_portion: Decimal,
    pub interest_portion: Decimal,
    pub new_balance: Decimal,
    pub new_interest: Decimal,
    pub new_status: LoanStatus,
}

/// Pure loan-balance arithmetic.
///
/// Every rule rejects before mutating: an oversized or misdirected payment
/// leaves the loan exactly as it was. Balances only ever decrease and never
/// go negative.
pub struct BalanceTracker;

impl BalanceTracker {
    /// Applies a payment (already converted to the ledger currency) against
    /// a loan and returns the resulting figures.
    pub fn apply_payment(
        loan: &Loan,
        applied_amount: Decimal,
        payment_type: PaymentType,
    ) -> Result<PaymentApplication> {
        if loan.status.is_closed() {
            return Err(AppError::LoanClosed(format!(
                "Loan {} is {} and no longer accepts payments",
                loan.id, loan.status
            )));
        }
        if applied_amount <= Decimal::ZERO {
            return Err(AppError::validation("Payment amount must be positive"));
        }

        let (principal_portion, interest_portion) = match payment_type {
            PaymentType::Principal => {
                if applied_amount > loan.current_balance {
                    return Err(AppError::PaymentExceedsBalance(format!(
                        "Payment of {} exceeds outstanding balance of {}",
                        applied_amount, loan.current_balance
                    )));
                }
                (applied_amount, Decimal::ZERO)
            }
            PaymentType::Interest => {
                if applied_amount > loan.accrued_interest {
                    return Err(AppError::PaymentExceedsBalance(format!(
                        "Payment of {} exceeds accrued interest of {}",
                        applied_amount, loan.accrued_interest
                    )));
                }
                (Decimal::ZERO, applied_amount)
            }
            PaymentType::Both => {
                let total_owed = loan.current_balance + loan.accrued_interest;
                if applied_amount > total_owed {
                    return Err(AppError::PaymentExceedsBalance(format!(
                        "Payment of {} exceeds total owed of {}",
                        applied_amount, total_owed
                    )));
                }
                // Interest clears first, remainder reduces principal
                let interest_portion = applied_amount.min(loan.accrued_interest);
                (applied_amount - interest_portion, interest_portion)
            }
        };

        let new_balance = loan.current_balance - principal_portion;
        let new_interest = loan.accrued_interest - interest_portion;

        let new_status = if new_balance.is_zero() && new_interest.is_zero() {
            LoanStatus::Paid
        } else {
            LoanStatus::Partial
        };

        Ok(PaymentApplication {
            applied_amount,
            principal_portion,
            interest_portion,
            new_balance,
            new_interest,
            new_status,
        })
    }

    /// A member's denormalized loan total: the sum of ledger balances over
    /// loans still outstanding (active or partially repaid).
    pub fn recompute_member_balance(loans: &[Loan]) -> Decimal {
        loans
            .iter()
            .filter(|loan| loan.status.is_outstanding())
            .map(|loan| loan.current_balance)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CurrencyCode;
    use crate::core::money::RateType;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn loan_with(balance: Decimal, interest: Decimal, status: LoanStatus) -> Loan {
        let now = Utc::now();
        Loan {
            id: Uuid::new_v4().to_string(),
            organization_id: "org-1".to_string(),
            account_id: Some("acc-1".to_string()),
            team_member_id: Some("tm-1".to_string()),
            original_amount: dec!(100),
            currency: CurrencyCode::new("USD").unwrap(),
            rate_type: RateType::Default,
            conversion_rate: None,
            base_amount: Some(dec!(100)),
            ledger_currency: CurrencyCode::new("USD").unwrap(),
            principal_amount: dec!(100),
            current_balance: balance,
            accrued_interest: interest,
            status,
            issued_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_partial_principal_payment() {
        let loan = loan_with(dec!(100), dec!(0), LoanStatus::Active);
        let applied =
            BalanceTracker::apply_payment(&loan, dec!(40), PaymentType::Principal).unwrap();

        assert_eq!(applied.new_balance, dec!(60));
        assert_eq!(applied.new_status, LoanStatus::Partial);
        assert_eq!(applied.principal_portion, dec!(40));
        assert_eq!(applied.interest_portion, dec!(0));
    }

    #[test]
    fn test_exact_payoff_marks_paid() {
        let loan = loan_with(dec!(60), dec!(0), LoanStatus::Partial);
        let applied =
            BalanceTracker::apply_payment(&loan, dec!(60), PaymentType::Principal).unwrap();

        assert_eq!(applied.new_balance, dec!(0));
        assert_eq!(applied.new_status, LoanStatus::Paid);
    }

    #[test]
    fn test_overpayment_rejected_before_mutation() {
        let loan = loan_with(dec!(60), dec!(0), LoanStatus::Partial);
        let err =
            BalanceTracker::apply_payment(&loan, dec!(61), PaymentType::Principal).unwrap_err();
        assert!(matches!(err, AppError::PaymentExceedsBalance(_)));
        // Caller's loan is untouched
        assert_eq!(loan.current_balance, dec!(60));
        assert_eq!(loan.status, LoanStatus::Partial);
    }

    #[test]
    fn test_closed_loans_reject_payments() {
        for status in [LoanStatus::Paid, LoanStatus::Cancelled] {
            let loan = loan_with(dec!(0), dec!(0), status);
            let err =
                BalanceTracker::apply_payment(&loan, dec!(1), PaymentType::Both).unwrap_err();
            assert!(matches!(err, AppError::LoanClosed(_)));
        }
    }

    #[test]
    fn test_defaulted_loan_accepts_payment_and_returns_to_partial() {
        let loan = loan_with(dec!(80), dec!(0), LoanStatus::Defaulted);
        let applied =
            BalanceTracker::apply_payment(&loan, dec!(30), PaymentType::Principal).unwrap();
        assert_eq!(applied.new_balance, dec!(50));
        assert_eq!(applied.new_status, LoanStatus::Partial);
    }

    #[test]
    fn test_interest_only_payment() {
        let loan = loan_with(dec!(100), dec!(15), LoanStatus::Active);
        let applied =
            BalanceTracker::apply_payment(&loan, dec!(10), PaymentType::Interest).unwrap();

        assert_eq!(applied.new_balance, dec!(100));
        assert_eq!(applied.new_interest, dec!(5));
        assert_eq!(applied.new_status, LoanStatus::Partial);
    }

    #[test]
    fn test_interest_payment_cannot_exceed_interest() {
        let loan = loan_with(dec!(100), dec!(15), LoanStatus::Active);
        let err =
            BalanceTracker::apply_payment(&loan, dec!(16), PaymentType::Interest).unwrap_err();
        assert!(matches!(err, AppError::PaymentExceedsBalance(_)));
    }

    #[test]
    fn test_both_clears_interest_first() {
        let loan = loan_with(dec!(100), dec!(15), LoanStatus::Active);
        let applied = BalanceTracker::apply_payment(&loan, dec!(40), PaymentType::Both).unwrap();

        assert_eq!(applied.interest_portion, dec!(15));
        assert_eq!(applied.principal_portion, dec!(25));
        assert_eq!(applied.new_interest, dec!(0));
        assert_eq!(applied.new_balance, dec!(75));
    }

    #[test]
    fn test_both_full_payoff() {
        let loan = loan_with(dec!(100), dec!(15), LoanStatus::Active);
        let applied = BalanceTracker::apply_payment(&loan, dec!(115), PaymentType::Both).unwrap();

        assert_eq!(applied.new_balance, dec!(0));
        assert_eq!(applied.new_interest, dec!(0));
        assert_eq!(applied.new_status, LoanStatus::Paid);
    }

    #[test]
    fn test_both_rejects_beyond_total_owed() {
        let loan = loan_with(dec!(100), dec!(15), LoanStatus::Active);
        let err =
            BalanceTracker::apply_payment(&loan, dec!(116), PaymentType::Both).unwrap_err();
        assert!(matches!(err, AppError::PaymentExceedsBalance(_)));
    }

    #[test]
    fn test_zero_and_negative_payments_rejected() {
        let loan = loan_with(dec!(100), dec!(0), LoanStatus::Active);
        assert!(BalanceTracker::apply_payment(&loan, dec!(0), PaymentType::Both).is_err());
        assert!(BalanceTracker::apply_payment(&loan, dec!(-5), PaymentType::Both).is_err());
    }

    #[test]
    fn test_principal_payment_leaves_interest_owing() {
        let loan = loan_with(dec!(50), dec!(10), LoanStatus::Partial);
        let applied =
            BalanceTracker::apply_payment(&loan, dec!(50), PaymentType::Principal).unwrap();

        // Balance cleared but interest remains: not paid yet
        assert_eq!(applied.new_balance, dec!(0));
        assert_eq!(applied.new_interest, dec!(10));
        assert_eq!(applied.new_status, LoanStatus::Partial);
    }

    #[test]
    fn test_member_balance_counts_outstanding_only() {
        let loans = vec![
            loan_with(dec!(100), dec!(0), LoanStatus::Active),
            loan_with(dec!(40), dec!(0), LoanStatus::Partial),
            loan_with(dec!(0), dec!(0), LoanStatus::Paid),
            loan_with(dec!(70), dec!(0), LoanStatus::Cancelled),
            loan_with(dec!(30), dec!(0), LoanStatus::Defaulted),
        ];

        assert_eq!(BalanceTracker::recompute_member_balance(&loans), dec!(140));
    }

    #[test]
    fn test_member_balance_empty() {
        assert_eq!(
            BalanceTracker::recompute_member_balance(&[]),
            Decimal::ZERO
        );
    }
}
