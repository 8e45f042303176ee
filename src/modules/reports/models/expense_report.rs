use crate::core::CurrencyCode;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One category's slice of a report. `share` is the percentage of the
/// report total, rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySlice {
    pub category: String,
    pub amount: Decimal,
    pub share: Decimal,
}

/// Totals per expense type, in the report currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeTotals {
    pub one_time: Decimal,
    pub subscription: Decimal,
    pub team_salary: Decimal,
}

/// The aggregated snapshot stored inside a report. Frozen at generation
/// time; later rate or expense edits never touch it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportData {
    pub total_expenses: Decimal,
    pub expense_count: usize,
    pub by_category: Vec<CategorySlice>,
    pub by_type: TypeTotals,
}

/// A persisted expense report. Write-once: reads return the stored snapshot
/// verbatim, and no update route exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseReport {
    pub id: String,
    pub organization_id: String,
    pub account_id: Option<String>,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub report_currency: CurrencyCode,
    pub total_expenses: Decimal,
    pub report_data: ReportData,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReportRequest {
    pub account_id: Option<String>,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    /// Defaults to the organization base currency.
    pub report_currency: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_report_data_json_shape() {
        let data = ReportData {
            total_expenses: dec!(150.00),
            expense_count: 2,
            by_category: vec![CategorySlice {
                category: "Cloud".to_string(),
                amount: dec!(150.00),
                share: dec!(100.00),
            }],
            by_type: TypeTotals {
                one_time: dec!(50.00),
                subscription: dec!(100.00),
                team_salary: dec!(0),
            },
        };

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["expense_count"], 2);
        assert_eq!(json["by_category"][0]["category"], "Cloud");

        let back: ReportData = serde_json::from_value(json).unwrap();
        assert_eq!(back.by_type.subscription, dec!(100.00));
    }
}
