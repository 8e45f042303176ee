use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::ExpenseSettings;
use crate::core::{AppError, CurrencyCode, Result};
use crate::modules::accounts::repositories::AccountRepository;
use crate::modules::currencies::repositories::CurrencyRateRepository;
use crate::modules::expenses::repositories::{CategoryRepository, ExpenseRepository};
use crate::modules::reports::models::{CreateReportRequest, ExpenseReport};
use crate::modules::reports::repositories::ReportRepository;
use crate::modules::reports::services::ReportAggregator;

/// Generates and serves expense report snapshots. Generation reads the
/// expenses and rates of the moment and freezes the aggregate; nothing that
/// happens later changes a stored report.
pub struct ReportService {
    reports: ReportRepository,
    expenses: ExpenseRepository,
    categories: CategoryRepository,
    rates: CurrencyRateRepository,
    accounts: AccountRepository,
    settings: ExpenseSettings,
}

impl ReportService {
    pub fn new(
        reports: ReportRepository,
        expenses: ExpenseRepository,
        categories: CategoryRepository,
        rates: CurrencyRateRepository,
        accounts: AccountRepository,
        settings: ExpenseSettings,
    ) -> Self {
        Self {
            reports,
            expenses,
            categories,
            rates,
            accounts,
            settings,
        }
    }

    fn validate_period(start: NaiveDate, end: NaiveDate) -> Result<()> {
        if start > end {
            return Err(AppError::validation(format!(
                "period_start ({}) must be on or before period_end ({})",
                start, end
            )));
        }
        let days = (end - start).num_days();
        if days > 366 {
            return Err(AppError::validation(format!(
                "Report period too long: {} days (maximum 366)",
                days
            )));
        }
        Ok(())
    }

    pub async fn generate(
        &self,
        organization_id: &str,
        request: CreateReportRequest,
    ) -> Result<ExpenseReport> {
        Self::validate_period(request.period_start, request.period_end)?;

        if let Some(ref account_id) = request.account_id {
            self.accounts.require(organization_id, account_id).await?;
        }

        let report_currency = match request.report_currency.as_deref() {
            Some(code) => CurrencyCode::new(code)?,
            None => self.settings.base_currency.clone(),
        };
        if !self.settings.is_supported(&report_currency) {
            return Err(AppError::validation(format!(
                "Currency {} is not in the supported list",
                report_currency
            )));
        }

        let table = self
            .rates
            .load_rate_table(organization_id, &self.settings.base_currency)
            .await?;
        if !table.supports(&report_currency) {
            return Err(AppError::rate_not_found(format!(
                "No conversion rate stored for report currency {}",
                report_currency
            )));
        }

        let expenses = self
            .expenses
            .list_for_period(
                organization_id,
                request.account_id.as_deref(),
                request.period_start,
                request.period_end,
            )
            .await?;
        let category_names: HashMap<String, String> = self
            .categories
            .list(organization_id)
            .await?
            .into_iter()
            .map(|category| (category.id, category.name))
            .collect();

        let data =
            ReportAggregator::aggregate(&expenses, &category_names, &report_currency, &table)?;

        if data.expense_count == 0 {
            warn!(
                organization_id = %organization_id,
                period_start = %request.period_start,
                period_end = %request.period_end,
                "report generated over an empty period"
            );
        }

        let report = ExpenseReport {
            id: Uuid::new_v4().to_string(),
            organization_id: organization_id.to_string(),
            account_id: request.account_id,
            period_start: request.period_start,
            period_end: request.period_end,
            report_currency,
            total_expenses: data.total_expenses,
            report_data: data,
            generated_at: Utc::now(),
        };

        let created = self.reports.create(&report).await?;
        info!(
            organization_id = %organization_id,
            report_id = %created.id,
            total = %created.total_expenses,
            currency = %created.report_currency,
            expense_count = created.report_data.expense_count,
            "expense report generated"
        );
        Ok(created)
    }

    /// Returns the stored snapshot verbatim.
    pub async fn get(&self, organization_id: &str, report_id: &str) -> Result<ExpenseReport> {
        self.reports.require(organization_id, report_id).await
    }

    pub async fn list(
        &self,
        organization_id: &str,
        account_id: Option<&str>,
    ) -> Result<Vec<ExpenseReport>> {
        self.reports.list(organization_id, account_id).await
    }

    pub async fn delete(&self, organization_id: &str, report_id: &str) -> Result<()> {
        self.reports.delete(organization_id, report_id).await?;
        info!(
            organization_id = %organization_id,
            report_id = %report_id,
            "expense report deleted"
        );
        Ok(())
    }
}
