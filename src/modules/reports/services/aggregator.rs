use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;

use crate::core::{CurrencyCode, RateTable, Result};
use crate::modules::expenses::models::{Expense, ExpenseType};
use crate::modules::reports::models::{CategorySlice, ReportData, TypeTotals};

const UNCATEGORIZED: &str = "Uncategorized";

/// Pure aggregation over a slice of expenses. Conversion policy per row:
/// rows with a stored `base_amount` convert in one leg from the base, so a
/// later change to the row's own currency rate cannot move old totals.
/// Legacy rows without one fall back to a two-leg conversion of the native
/// amount and fail the whole report when a rate is missing.
pub struct ReportAggregator;

impl ReportAggregator {
    pub fn aggregate(
        expenses: &[Expense],
        category_names: &HashMap<String, String>,
        report_currency: &CurrencyCode,
        table: &RateTable,
    ) -> Result<ReportData> {
        let mut total = Decimal::ZERO;
        let mut by_category: BTreeMap<String, Decimal> = BTreeMap::new();
        let mut one_time = Decimal::ZERO;
        let mut subscription = Decimal::ZERO;
        let mut team_salary = Decimal::ZERO;

        for expense in expenses {
            let converted = Self::convert_expense(expense, report_currency, table)?;
            total += converted;

            let name = expense
                .category_id
                .as_ref()
                .and_then(|id| category_names.get(id))
                .cloned()
                .unwrap_or_else(|| UNCATEGORIZED.to_string());
            *by_category.entry(name).or_insert(Decimal::ZERO) += converted;

            match expense.expense_type {
                ExpenseType::OneTime => one_time += converted,
                ExpenseType::Subscription => subscription += converted,
                ExpenseType::TeamSalary => team_salary += converted,
            }
        }

        // Full precision inside the loop; rounding happens only here.
        let mut slices: Vec<CategorySlice> = by_category
            .into_iter()
            .map(|(category, amount)| {
                let share = if total.is_zero() {
                    Decimal::ZERO
                } else {
                    (amount / total * Decimal::ONE_HUNDRED).round_dp(2)
                };
                CategorySlice {
                    category,
                    amount: amount.round_dp(2),
                    share,
                }
            })
            .collect();
        slices.sort_by(|a, b| {
            b.amount
                .cmp(&a.amount)
                .then_with(|| a.category.cmp(&b.category))
        });

        Ok(ReportData {
            total_expenses: total.round_dp(2),
            expense_count: expenses.len(),
            by_category: slices,
            by_type: TypeTotals {
                one_time: one_time.round_dp(2),
                subscription: subscription.round_dp(2),
                team_salary: team_salary.round_dp(2),
            },
        })
    }

    fn convert_expense(
        expense: &Expense,
        report_currency: &CurrencyCode,
        table: &RateTable,
    ) -> Result<Decimal> {
        match expense.base_amount {
            Some(base) => table.from_base(base, report_currency),
            None => table.convert(expense.amount, &expense.currency, report_currency),
        }
    }
}
