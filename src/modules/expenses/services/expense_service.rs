use crate::config::ExpenseSettings;
use crate::core::money::{resolve, MonetaryAmount, RateType};
use crate::core::{AppError, CurrencyCode, Result};
use crate::modules::accounts::repositories::AccountRepository;
use crate::modules::currencies::repositories::CurrencyRateRepository;
use crate::modules::expenses::models::{
    CreateExpenseRequest, Expense, ExpenseType, UpdateExpenseRequest,
};
use crate::modules::expenses::repositories::{CategoryRepository, ExpenseFilters, ExpenseRepository};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

const DEFAULT_LIST_LIMIT: i64 = 50;
const MAX_LIST_LIMIT: i64 = 500;

/// Business logic for expenses: resolves monetary amounts once at write time
/// and enforces the type-specific link rules.
pub struct ExpenseService {
    expenses: ExpenseRepository,
    categories: CategoryRepository,
    accounts: AccountRepository,
    rates: CurrencyRateRepository,
    settings: ExpenseSettings,
}

impl ExpenseService {
    pub fn new(
        expenses: ExpenseRepository,
        categories: CategoryRepository,
        accounts: AccountRepository,
        rates: CurrencyRateRepository,
        settings: ExpenseSettings,
    ) -> Self {
        Self {
            expenses,
            categories,
            accounts,
            rates,
            settings,
        }
    }

    pub async fn create(
        &self,
        organization_id: &str,
        request: CreateExpenseRequest,
    ) -> Result<Expense> {
        self.accounts
            .require(organization_id, &request.account_id)
            .await?;

        if let Some(ref category_id) = request.category_id {
            self.require_category(organization_id, category_id).await?;
        }

        let expense_type = request.expense_type.unwrap_or(ExpenseType::OneTime);
        self.check_links(
            organization_id,
            expense_type,
            request.team_member_id.as_deref(),
            request.subscription_id.as_deref(),
        )
        .await?;

        let currency = CurrencyCode::new(&request.currency)?;
        if !self.settings.is_supported(&currency) {
            return Err(AppError::validation(format!(
                "Currency {} is not in the supported list",
                currency
            )));
        }

        let table = self
            .rates
            .load_rate_table(organization_id, &self.settings.base_currency)
            .await?;
        let resolved = resolve(
            &MonetaryAmount {
                amount: request.amount,
                currency,
            },
            request.rate_type,
            request.conversion_rate,
            &table,
        )?;

        let now = Utc::now();
        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            account_id: request.account_id,
            category_id: request.category_id,
            description: request.description,
            amount: resolved.amount,
            currency: resolved.currency,
            rate_type: resolved.rate_type,
            conversion_rate: resolved.conversion_rate,
            base_amount: Some(resolved.base_amount),
            expense_date: request.expense_date,
            expense_type,
            team_member_id: request.team_member_id,
            subscription_id: request.subscription_id,
            salary_month: request.salary_month,
            auto_generated: false,
            created_at: now,
            updated_at: now,
        };
        expense.validate_links()?;

        let created = self.expenses.create(&expense).await?;
        info!(
            organization_id = %organization_id,
            expense_id = %created.id,
            amount = %created.amount,
            currency = %created.currency,
            "expense recorded"
        );
        Ok(created)
    }

    pub async fn get(&self, organization_id: &str, expense_id: &str) -> Result<Expense> {
        self.expenses.require(organization_id, expense_id).await
    }

    pub async fn list(
        &self,
        organization_id: &str,
        mut filters: ExpenseFilters,
    ) -> Result<Vec<Expense>> {
        if filters.limit <= 0 {
            filters.limit = DEFAULT_LIST_LIMIT;
        }
        filters.limit = filters.limit.min(MAX_LIST_LIMIT);
        filters.offset = filters.offset.max(0);

        self.expenses.list(organization_id, &filters).await
    }

    pub async fn update(
        &self,
        organization_id: &str,
        expense_id: &str,
        request: UpdateExpenseRequest,
    ) -> Result<Expense> {
        let mut expense = self.expenses.require(organization_id, expense_id).await?;

        if let Some(ref category_id) = request.category_id {
            self.require_category(organization_id, category_id).await?;
            expense.category_id = Some(category_id.clone());
        }
        if let Some(description) = request.description.clone() {
            expense.description = Some(description);
        }
        if let Some(expense_date) = request.expense_date {
            expense.expense_date = expense_date;
        }

        if request.touches_money() {
            let currency = match request.currency {
                Some(ref c) => {
                    let code = CurrencyCode::new(c)?;
                    if !self.settings.is_supported(&code) {
                        return Err(AppError::validation(format!(
                            "Currency {} is not in the supported list",
                            code
                        )));
                    }
                    code
                }
                None => expense.currency.clone(),
            };
            let amount = request.amount.unwrap_or(expense.amount);
            let rate_type = request.rate_type.unwrap_or(expense.rate_type);
            let custom_rate = match rate_type {
                RateType::Custom => request.conversion_rate.or(expense.conversion_rate),
                RateType::Default => request.conversion_rate,
            };

            let table = self
                .rates
                .load_rate_table(organization_id, &self.settings.base_currency)
                .await?;
            let resolved = resolve(
                &MonetaryAmount { amount, currency },
                rate_type,
                custom_rate,
                &table,
            )?;

            expense.amount = resolved.amount;
            expense.currency = resolved.currency;
            expense.rate_type = resolved.rate_type;
            expense.conversion_rate = resolved.conversion_rate;
            expense.base_amount = Some(resolved.base_amount);
        }

        self.expenses.update(organization_id, &expense).await
    }

    pub async fn delete(&self, organization_id: &str, expense_id: &str) -> Result<()> {
        let deleted = self.expenses.delete(organization_id, expense_id).await?;
        if !deleted {
            return Err(AppError::not_found(format!(
                "Expense {} not found",
                expense_id
            )));
        }

        info!(organization_id = %organization_id, expense_id = %expense_id, "expense deleted");
        Ok(())
    }

    async fn require_category(&self, organization_id: &str, category_id: &str) -> Result<()> {
        self.categories
            .find_by_id(organization_id, category_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Category {} not found", category_id)))?;
        Ok(())
    }

    async fn check_links(
        &self,
        organization_id: &str,
        expense_type: ExpenseType,
        team_member_id: Option<&str>,
        subscription_id: Option<&str>,
    ) -> Result<()> {
        if expense_type == ExpenseType::TeamSalary {
            if let Some(member_id) = team_member_id {
                if !self
                    .expenses
                    .team_member_exists(organization_id, member_id)
                    .await?
                {
                    return Err(AppError::not_found(format!(
                        "Team member {} not found",
                        member_id
                    )));
                }
            }
        }
        if expense_type == ExpenseType::Subscription {
            if let Some(subscription_id) = subscription_id {
                if !self
                    .expenses
                    .subscription_exists(organization_id, subscription_id)
                    .await?
                {
                    return Err(AppError::not_found(format!(
                        "Subscription {} not found",
                        subscription_id
                    )));
                }
            }
        }
        Ok(())
    }
}
