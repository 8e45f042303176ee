// Report aggregation: totals, category breakdown and per-type buckets over
// a set of expenses, converted into the report currency.
//
// Rows carrying a stored base amount convert in one leg from the base, so
// editing a rate after the fact cannot move totals that were already
// resolved at write time. Legacy rows without one fall back to a two-leg
// conversion and fail the whole report when no rate exists.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use spendbase::core::money::RateType;
use spendbase::core::{AppError, CurrencyCode, RateTable};
use spendbase::modules::expenses::models::{Expense, ExpenseType};
use spendbase::modules::reports::services::ReportAggregator;

fn code(s: &str) -> CurrencyCode {
    CurrencyCode::new(s).unwrap()
}

fn expense(
    amount: Decimal,
    currency: &str,
    base_amount: Option<Decimal>,
    category_id: Option<&str>,
    expense_type: ExpenseType,
) -> Expense {
    let now = Utc::now();
    Expense {
        id: format!("exp-{}", amount),
        account_id: "acc-1".to_string(),
        category_id: category_id.map(str::to_string),
        description: None,
        amount,
        currency: code(currency),
        rate_type: RateType::Default,
        conversion_rate: None,
        base_amount,
        expense_date: NaiveDate::from_ymd_opt(2025, 5, 10).unwrap(),
        expense_type,
        team_member_id: None,
        subscription_id: None,
        salary_month: None,
        auto_generated: false,
        created_at: now,
        updated_at: now,
    }
}

fn categories() -> HashMap<String, String> {
    HashMap::from([
        ("cat-travel".to_string(), "Travel".to_string()),
        ("cat-meals".to_string(), "Meals".to_string()),
    ])
}

/// A row resolved at 0.90 keeps its base amount of 100 even after the EUR
/// rate is edited; the report total must not move.
#[test]
fn test_totals_survive_rate_edits() {
    let rows = vec![expense(
        dec!(90),
        "EUR",
        Some(dec!(100)),
        None,
        ExpenseType::OneTime,
    )];

    let at_write = RateTable::with_rates(code("USD"), vec![(code("EUR"), dec!(0.90))]).unwrap();
    let after_edit = RateTable::with_rates(code("USD"), vec![(code("EUR"), dec!(0.45))]).unwrap();

    for table in [at_write, after_edit] {
        let data =
            ReportAggregator::aggregate(&rows, &categories(), &code("USD"), &table).unwrap();
        assert_eq!(data.total_expenses, dec!(100));
    }
}

/// Rows predating stored base amounts convert through the base with the
/// current rate: 90 EUR at 0.90 still lands at 100.
#[test]
fn test_legacy_rows_convert_two_leg() {
    let rows = vec![expense(dec!(90), "EUR", None, None, ExpenseType::OneTime)];
    let table = RateTable::with_rates(code("USD"), vec![(code("EUR"), dec!(0.90))]).unwrap();

    let data = ReportAggregator::aggregate(&rows, &categories(), &code("USD"), &table).unwrap();
    assert_eq!(data.total_expenses, dec!(100));
}

/// One unconvertible legacy row poisons the whole report; a partial total
/// would silently undercount.
#[test]
fn test_unconvertible_legacy_row_fails_whole_report() {
    let rows = vec![
        expense(dec!(50), "USD", Some(dec!(50)), None, ExpenseType::OneTime),
        expense(dec!(10), "GBP", None, None, ExpenseType::OneTime),
    ];
    let table = RateTable::new(code("USD"));

    let err = ReportAggregator::aggregate(&rows, &categories(), &code("USD"), &table)
        .unwrap_err();
    assert!(matches!(err, AppError::RateNotFound(_)));
}

/// Categories accumulate, shares are percentages of the total, and slices
/// come back sorted largest first.
#[test]
fn test_category_breakdown_with_shares() {
    let rows = vec![
        expense(
            dec!(45),
            "USD",
            Some(dec!(45)),
            Some("cat-travel"),
            ExpenseType::OneTime,
        ),
        expense(
            dec!(30),
            "USD",
            Some(dec!(30)),
            Some("cat-travel"),
            ExpenseType::OneTime,
        ),
        expense(dec!(25), "USD", Some(dec!(25)), None, ExpenseType::OneTime),
    ];
    let table = RateTable::new(code("USD"));

    let data = ReportAggregator::aggregate(&rows, &categories(), &code("USD"), &table).unwrap();

    assert_eq!(data.total_expenses, dec!(100));
    assert_eq!(data.expense_count, 3);
    assert_eq!(data.by_category.len(), 2);

    assert_eq!(data.by_category[0].category, "Travel");
    assert_eq!(data.by_category[0].amount, dec!(75));
    assert_eq!(data.by_category[0].share, dec!(75.00));

    assert_eq!(data.by_category[1].category, "Uncategorized");
    assert_eq!(data.by_category[1].amount, dec!(25));
    assert_eq!(data.by_category[1].share, dec!(25.00));
}

/// A category id with no surviving category folds into Uncategorized
/// together with rows that never had one.
#[test]
fn test_unknown_category_id_folds_into_uncategorized() {
    let rows = vec![
        expense(
            dec!(40),
            "USD",
            Some(dec!(40)),
            Some("cat-deleted"),
            ExpenseType::OneTime,
        ),
        expense(dec!(10), "USD", Some(dec!(10)), None, ExpenseType::OneTime),
    ];
    let table = RateTable::new(code("USD"));

    let data = ReportAggregator::aggregate(&rows, &categories(), &code("USD"), &table).unwrap();

    assert_eq!(data.by_category.len(), 1);
    assert_eq!(data.by_category[0].category, "Uncategorized");
    assert_eq!(data.by_category[0].amount, dec!(50));
}

/// Shares round to two decimals; thirds land on 33.33 and 66.67.
#[test]
fn test_shares_round_to_two_decimals() {
    let rows = vec![
        expense(
            dec!(1),
            "USD",
            Some(dec!(1)),
            Some("cat-travel"),
            ExpenseType::OneTime,
        ),
        expense(
            dec!(2),
            "USD",
            Some(dec!(2)),
            Some("cat-meals"),
            ExpenseType::OneTime,
        ),
    ];
    let table = RateTable::new(code("USD"));

    let data = ReportAggregator::aggregate(&rows, &categories(), &code("USD"), &table).unwrap();

    assert_eq!(data.by_category[0].category, "Meals");
    assert_eq!(data.by_category[0].share, dec!(66.67));
    assert_eq!(data.by_category[1].category, "Travel");
    assert_eq!(data.by_category[1].share, dec!(33.33));
}

/// Reports can be drawn in any supported currency: 100 in base becomes 90
/// at an EUR rate of 0.90.
#[test]
fn test_report_in_non_base_currency() {
    let rows = vec![expense(
        dec!(100),
        "USD",
        Some(dec!(100)),
        None,
        ExpenseType::OneTime,
    )];
    let table = RateTable::with_rates(code("USD"), vec![(code("EUR"), dec!(0.90))]).unwrap();

    let data = ReportAggregator::aggregate(&rows, &categories(), &code("EUR"), &table).unwrap();
    assert_eq!(data.total_expenses, dec!(90.00));
}

/// One-time, subscription and salary expenses land in separate buckets.
#[test]
fn test_type_buckets() {
    let rows = vec![
        expense(dec!(10), "USD", Some(dec!(10)), None, ExpenseType::OneTime),
        expense(
            dec!(20),
            "USD",
            Some(dec!(20)),
            None,
            ExpenseType::Subscription,
        ),
        expense(
            dec!(70),
            "USD",
            Some(dec!(70)),
            None,
            ExpenseType::TeamSalary,
        ),
    ];
    let table = RateTable::new(code("USD"));

    let data = ReportAggregator::aggregate(&rows, &categories(), &code("USD"), &table).unwrap();

    assert_eq!(data.by_type.one_time, dec!(10));
    assert_eq!(data.by_type.subscription, dec!(20));
    assert_eq!(data.by_type.team_salary, dec!(70));
    assert_eq!(data.total_expenses, dec!(100));
}

/// An empty period yields a zeroed snapshot, not an error.
#[test]
fn test_empty_period_aggregates_to_zero() {
    let table = RateTable::new(code("USD"));
    let data = ReportAggregator::aggregate(&[], &categories(), &code("USD"), &table).unwrap();

    assert_eq!(data.total_expenses, Decimal::ZERO);
    assert_eq!(data.expense_count, 0);
    assert!(data.by_category.is_empty());
    assert_eq!(data.by_type.one_time, Decimal::ZERO);
}

proptest! {
    /// For any mix of base-currency expenses the breakdowns tie back to
    /// the total: type buckets and category amounts each sum to it, and
    /// shares add up to 100 within rounding.
    #[test]
    fn prop_breakdowns_tie_back_to_total(
        rows in prop::collection::vec(
            (1u64..1_000_000u64, 0usize..3usize, 0usize..3usize),
            1..12,
        )
    ) {
        let category_ids = ["cat-travel", "cat-meals"];
        let types = [
            ExpenseType::OneTime,
            ExpenseType::Subscription,
            ExpenseType::TeamSalary,
        ];

        let expenses: Vec<Expense> = rows
            .iter()
            .map(|&(cents, type_idx, category_idx)| {
                let amount = Decimal::from(cents) / Decimal::from(100);
                let category = category_idx.checked_sub(1).map(|i| category_ids[i]);
                expense(amount, "USD", Some(amount), category, types[type_idx])
            })
            .collect();

        let table = RateTable::new(code("USD"));
        let data =
            ReportAggregator::aggregate(&expenses, &categories(), &code("USD"), &table)
                .unwrap();

        let expected: Decimal = expenses.iter().map(|e| e.amount).sum();
        prop_assert_eq!(data.total_expenses, expected);
        prop_assert_eq!(data.expense_count, expenses.len());

        let type_sum = data.by_type.one_time + data.by_type.subscription + data.by_type.team_salary;
        prop_assert_eq!(type_sum, expected);

        let category_sum: Decimal = data.by_category.iter().map(|s| s.amount).sum();
        prop_assert_eq!(category_sum, expected);

        let share_sum: Decimal = data.by_category.iter().map(|s| s.share).sum();
        let drift = (share_sum - Decimal::ONE_HUNDRED).abs();
        prop_assert!(
            drift < dec!(0.05),
            "shares summed to {} across {} slices",
            share_sum, data.by_category.len()
        );
    }
}
