use crate::config::ExpenseSettings;
use crate::core::money::{resolve, MonetaryAmount, RateType, ResolvedAmount};
use crate::core::{AppError, CurrencyCode, Result};
use crate::modules::accounts::repositories::AccountRepository;
use crate::modules::currencies::repositories::CurrencyRateRepository;
use crate::modules::expenses::models::{Expense, ExpenseType};
use crate::modules::expenses::repositories::ExpenseRepository;
use crate::modules::subscriptions::models::{
    CreateSubscriptionRequest, Subscription, SubscriptionStatus, UpdateSubscriptionRequest,
};
use crate::modules::subscriptions::repositories::SubscriptionRepository;
use crate::modules::subscriptions::services::RenewalCalculator;
use chrono::{NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

/// Orchestrates subscription lifecycle: creation with catch-up scheduling,
/// manual renewals, and the linked auto-generated expenses.
pub struct SubscriptionService {
    subscriptions: SubscriptionRepository,
    expenses: ExpenseRepository,
    accounts: AccountRepository,
    rates: CurrencyRateRepository,
    settings: ExpenseSettings,
}

impl SubscriptionService {
    pub fn new(
        subscriptions: SubscriptionRepository,
        expenses: ExpenseRepository,
        accounts: AccountRepository,
        rates: CurrencyRateRepository,
        settings: ExpenseSettings,
    ) -> Self {
        Self {
            subscriptions,
            expenses,
            accounts,
            rates,
            settings,
        }
    }

    pub async fn create(
        &self,
        organization_id: &str,
        request: CreateSubscriptionRequest,
    ) -> Result<Subscription> {
        self.accounts
            .require(organization_id, &request.account_id)
            .await?;

        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::validation("Subscription name cannot be empty"));
        }
        if request.reminder_days < 0 {
            return Err(AppError::validation("reminder_days cannot be negative"));
        }

        let resolved = self
            .resolve_amount(
                organization_id,
                request.amount,
                &request.currency,
                request.rate_type,
                request.conversion_rate,
            )
            .await?;

        let today = Utc::now().date_naive();
        let (renewal_date, owes_expense) =
            RenewalCalculator::initial_schedule(request.start_date, request.renewal_frequency, today)?;
        let next_reminder_date = RenewalCalculator::reminder_date(renewal_date, request.reminder_days);

        let now = Utc::now();
        let subscription = Subscription {
            id: Uuid::new_v4().to_string(),
            account_id: request.account_id,
            name,
            amount: resolved.amount,
            currency: resolved.currency.clone(),
            rate_type: resolved.rate_type,
            conversion_rate: resolved.conversion_rate,
            base_amount: Some(resolved.base_amount),
            start_date: request.start_date,
            renewal_date,
            renewal_frequency: request.renewal_frequency,
            reminder_days: request.reminder_days,
            next_reminder_date,
            status: SubscriptionStatus::Active,
            created_at: now,
            updated_at: now,
        };

        let created = self.subscriptions.create(&subscription).await?;

        if owes_expense {
            self.record_cycle_expense(&created, &resolved, created.start_date)
                .await?;
        }

        info!(
            organization_id = %organization_id,
            subscription_id = %created.id,
            renewal_date = %created.renewal_date,
            auto_expense = owes_expense,
            "subscription created"
        );
        Ok(created)
    }

    pub async fn get(&self, organization_id: &str, subscription_id: &str) -> Result<Subscription> {
        self.subscriptions
            .require(organization_id, subscription_id)
            .await
    }

    pub async fn list(
        &self,
        organization_id: &str,
        account_id: Option<&str>,
        status: Option<SubscriptionStatus>,
    ) -> Result<Vec<Subscription>> {
        self.subscriptions
            .list(organization_id, account_id, status)
            .await
    }

    pub async fn update(
        &self,
        organization_id: &str,
        subscription_id: &str,
        request: UpdateSubscriptionRequest,
    ) -> Result<Subscription> {
        let mut subscription = self
            .subscriptions
            .require(organization_id, subscription_id)
            .await?;

        if subscription.status == SubscriptionStatus::Cancelled {
            return Err(AppError::validation(
                "Cancelled subscriptions cannot be updated",
            ));
        }

        if let Some(name) = request.name.as_deref() {
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::validation("Subscription name cannot be empty"));
            }
            subscription.name = name.to_string();
        }

        if let Some(status) = request.status {
            if status == SubscriptionStatus::Cancelled {
                return Err(AppError::validation(
                    "Use the cancel endpoint to cancel a subscription",
                ));
            }
            subscription.status = status;
        }

        let mut reschedule = false;
        if let Some(renewal_date) = request.renewal_date {
            RenewalCalculator::ensure_not_past(renewal_date, Utc::now().date_naive())?;
            subscription.renewal_date = renewal_date;
            reschedule = true;
        }
        if let Some(reminder_days) = request.reminder_days {
            if reminder_days < 0 {
                return Err(AppError::validation("reminder_days cannot be negative"));
            }
            subscription.reminder_days = reminder_days;
            reschedule = true;
        }
        if reschedule {
            subscription.next_reminder_date = RenewalCalculator::reminder_date(
                subscription.renewal_date,
                subscription.reminder_days,
            );
        }

        if request.touches_money() {
            let currency = match request.currency.as_deref() {
                Some(c) => c.to_string(),
                None => subscription.currency.to_string(),
            };
            let amount = request.amount.unwrap_or(subscription.amount);
            let rate_type = request.rate_type.unwrap_or(subscription.rate_type);
            let custom_rate = match rate_type {
                RateType::Custom => request.conversion_rate.or(subscription.conversion_rate),
                RateType::Default => request.conversion_rate,
            };

            let resolved = self
                .resolve_amount(organization_id, amount, &currency, rate_type, custom_rate)
                .await?;
            subscription.amount = resolved.amount;
            subscription.currency = resolved.currency;
            subscription.rate_type = resolved.rate_type;
            subscription.conversion_rate = resolved.conversion_rate;
            subscription.base_amount = Some(resolved.base_amount);
        }

        self.subscriptions.update(organization_id, &subscription).await
    }

    /// Bills the current cycle and moves the renewal forward.
    ///
    /// The generated expense is dated at the renewal date being billed; the
    /// next renewal lands strictly in the future even after long neglect.
    pub async fn renew(&self, organization_id: &str, subscription_id: &str) -> Result<Subscription> {
        let mut subscription = self
            .subscriptions
            .require(organization_id, subscription_id)
            .await?;

        if subscription.status != SubscriptionStatus::Active {
            return Err(AppError::validation(format!(
                "Cannot renew a {} subscription",
                subscription.status
            )));
        }

        let billed_date = subscription.renewal_date;

        // Re-resolve at renewal time so the expense carries today's rate
        // for default-rate subscriptions; custom rates stay pinned.
        let custom_rate = match subscription.rate_type {
            RateType::Custom => subscription.conversion_rate,
            RateType::Default => None,
        };
        let resolved = self
            .resolve_amount(
                organization_id,
                subscription.amount,
                subscription.currency.as_str(),
                subscription.rate_type,
                custom_rate,
            )
            .await?;

        self.record_cycle_expense(&subscription, &resolved, billed_date)
            .await?;

        let today = Utc::now().date_naive();
        let stepped = subscription.renewal_frequency.next(billed_date)?;
        subscription.renewal_date =
            RenewalCalculator::advance_into_future(stepped, subscription.renewal_frequency, today)?;
        subscription.next_reminder_date = RenewalCalculator::reminder_date(
            subscription.renewal_date,
            subscription.reminder_days,
        );

        let updated = self.subscriptions.update(organization_id, &subscription).await?;
        info!(
            organization_id = %organization_id,
            subscription_id = %updated.id,
            billed_date = %billed_date,
            next_renewal = %updated.renewal_date,
            "subscription renewed"
        );
        Ok(updated)
    }

    pub async fn cancel(&self, organization_id: &str, subscription_id: &str) -> Result<Subscription> {
        let mut subscription = self
            .subscriptions
            .require(organization_id, subscription_id)
            .await?;

        if subscription.status == SubscriptionStatus::Cancelled {
            return Err(AppError::validation("Subscription is already cancelled"));
        }

        subscription.status = SubscriptionStatus::Cancelled;
        let updated = self.subscriptions.update(organization_id, &subscription).await?;

        info!(
            organization_id = %organization_id,
            subscription_id = %updated.id,
            "subscription cancelled"
        );
        Ok(updated)
    }

    pub async fn delete(&self, organization_id: &str, subscription_id: &str) -> Result<()> {
        let deleted = self
            .subscriptions
            .delete(organization_id, subscription_id)
            .await?;
        if !deleted {
            return Err(AppError::not_found(format!(
                "Subscription {} not found",
                subscription_id
            )));
        }

        info!(
            organization_id = %organization_id,
            subscription_id = %subscription_id,
            "subscription deleted"
        );
        Ok(())
    }

    async fn resolve_amount(
        &self,
        organization_id: &str,
        amount: rust_decimal::Decimal,
        currency: &str,
        rate_type: RateType,
        custom_rate: Option<rust_decimal::Decimal>,
    ) -> Result<ResolvedAmount> {
        let currency = CurrencyCode::new(currency)?;
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
        resolve(
            &MonetaryAmount { amount, currency },
            rate_type,
            custom_rate,
            &table,
        )
    }

    async fn record_cycle_expense(
        &self,
        subscription: &Subscription,
        resolved: &ResolvedAmount,
        expense_date: NaiveDate,
    ) -> Result<()> {
        let now = Utc::now();
        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            account_id: subscription.account_id.clone(),
            category_id: None,
            description: Some(format!("{} subscription", subscription.name)),
            amount: resolved.amount,
            currency: resolved.currency.clone(),
            rate_type: resolved.rate_type,
            conversion_rate: resolved.conversion_rate,
            base_amount: Some(resolved.base_amount),
            expense_date,
            expense_type: ExpenseType::Subscription,
            team_member_id: None,
            subscription_id: Some(subscription.id.clone()),
            salary_month: None,
            auto_generated: true,
            created_at: now,
            updated_at: now,
        };

        self.expenses.create(&expense).await?;
        Ok(())
    }
}
