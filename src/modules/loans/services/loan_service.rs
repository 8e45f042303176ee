use crate::config::ExpenseSettings;
use crate::core::money::{resolve, MonetaryAmount};
use crate::core::{AppError, CurrencyCode, Result};
use crate::modules::accounts::repositories::AccountRepository;
use crate::modules::currencies::repositories::CurrencyRateRepository;
use crate::modules::loans::models::{
    CreateLoanPaymentRequest, CreateLoanRequest, Loan, LoanPayment, LoanResponse, LoanStatus,
};
use crate::modules::loans::repositories::{LoanFilters, LoanRepository};
use crate::modules::loans::services::BalanceTracker;
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

/// Orchestrates loan lifecycle around the pure balance tracker: creation
/// with the one-time ledger conversion, payments, status flips and deletes.
pub struct LoanService {
    loans: LoanRepository,
    accounts: AccountRepository,
    rates: CurrencyRateRepository,
    settings: ExpenseSettings,
}

impl LoanService {
    pub fn new(
        loans: LoanRepository,
        accounts: AccountRepository,
        rates: CurrencyRateRepository,
        settings: ExpenseSettings,
    ) -> Self {
        Self {
            loans,
            accounts,
            rates,
            settings,
        }
    }

    pub async fn create(
        &self,
        organization_id: &str,
        request: CreateLoanRequest,
    ) -> Result<LoanResponse> {
        if request.account_id.is_none() && request.team_member_id.is_none() {
            return Err(AppError::validation(
                "A loan needs an account, a team member, or both",
            ));
        }
        if request.amount <= Decimal::ZERO {
            return Err(AppError::validation("Loan amount must be positive"));
        }
        let accrued_interest = request.interest_amount.unwrap_or(Decimal::ZERO);
        if accrued_interest < Decimal::ZERO {
            return Err(AppError::validation("Interest amount cannot be negative"));
        }

        // Ledger currency: the owning account's, or the org base for
        // standalone member loans.
        let ledger_currency = match request.account_id.as_deref() {
            Some(account_id) => {
                let account = self.accounts.require(organization_id, account_id).await?;
                account.currency
            }
            None => self.settings.base_currency.clone(),
        };

        if let Some(ref member_id) = request.team_member_id {
            if !self
                .loans
                .team_member_exists(organization_id, member_id)
                .await?
            {
                return Err(AppError::not_found(format!(
                    "Team member {} not found",
                    member_id
                )));
            }
        }

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

        // One-time conversion into the ledger; repayments track this figure,
        // not a live rate.
        let principal_amount = if ledger_currency == *table.base() {
            resolved.base_amount
        } else {
            table.from_base(resolved.base_amount, &ledger_currency)?
        };

        let now = Utc::now();
        let loan = Loan {
            id: Uuid::new_v4().to_string(),
            organization_id: organization_id.to_string(),
            account_id: request.account_id,
            team_member_id: request.team_member_id,
            original_amount: resolved.amount,
            currency: resolved.currency,
            rate_type: resolved.rate_type,
            conversion_rate: resolved.conversion_rate,
            base_amount: Some(resolved.base_amount),
            ledger_currency,
            principal_amount,
            current_balance: principal_amount,
            accrued_interest,
            status: LoanStatus::Active,
            issued_date: request.issued_date,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        };

        let created = self.loans.create(&loan).await?;
        info!(
            organization_id = %organization_id,
            loan_id = %created.id,
            principal = %created.principal_amount,
            ledger_currency = %created.ledger_currency,
            "loan issued"
        );
        Ok(LoanResponse::from(created))
    }

    pub async fn get(&self, organization_id: &str, loan_id: &str) -> Result<LoanResponse> {
        let loan = self.loans.require(organization_id, loan_id).await?;
        Ok(LoanResponse::from(loan))
    }

    pub async fn list(
        &self,
        organization_id: &str,
        filters: LoanFilters,
    ) -> Result<Vec<LoanResponse>> {
        let loans = self.loans.list(organization_id, &filters).await?;
        Ok(loans.into_iter().map(LoanResponse::from).collect())
    }

    /// Applies a payment to a loan. The whole write (ledger row, loan
    /// figures, member total) commits atomically or not at all.
    pub async fn record_payment(
        &self,
        organization_id: &str,
        loan_id: &str,
        request: CreateLoanPaymentRequest,
    ) -> Result<(LoanPayment, LoanResponse)> {
        let mut loan = self.loans.require(organization_id, loan_id).await?;

        if loan.status.is_closed() {
            return Err(AppError::LoanClosed(format!(
                "Loan {} is {} and no longer accepts payments",
                loan.id, loan.status
            )));
        }

        let payment_currency = match request.currency.as_deref() {
            Some(code) => CurrencyCode::new(code)?,
            None => loan.ledger_currency.clone(),
        };
        if !self.settings.is_supported(&payment_currency) {
            return Err(AppError::validation(format!(
                "Currency {} is not in the supported list",
                payment_currency
            )));
        }

        let applied_amount = if payment_currency == loan.ledger_currency {
            request.amount
        } else {
            let table = self
                .rates
                .load_rate_table(organization_id, &self.settings.base_currency)
                .await?;
            table.convert(request.amount, &payment_currency, &loan.ledger_currency)?
        };

        let application =
            BalanceTracker::apply_payment(&loan, applied_amount, request.payment_type)?;

        let conversion_rate = if payment_currency == loan.ledger_currency {
            None
        } else {
            // applied > 0 here, so the native amount is non-zero
            Some(application.applied_amount / request.amount)
        };

        let payment = LoanPayment {
            id: Uuid::new_v4().to_string(),
            loan_id: loan.id.clone(),
            amount: request.amount,
            currency: payment_currency,
            conversion_rate,
            applied_amount: application.applied_amount,
            payment_date: request.payment_date,
            payment_type: request.payment_type,
            notes: request.notes,
            created_at: Utc::now(),
        };

        loan.current_balance = application.new_balance;
        loan.accrued_interest = application.new_interest;
        loan.status = application.new_status;

        let recorded = self.loans.record_payment(&loan, &payment).await?;
        info!(
            organization_id = %organization_id,
            loan_id = %loan.id,
            applied = %recorded.applied_amount,
            new_balance = %loan.current_balance,
            status = %loan.status,
            "loan payment recorded"
        );
        Ok((recorded, LoanResponse::from(loan)))
    }

    pub async fn list_payments(
        &self,
        organization_id: &str,
        loan_id: &str,
    ) -> Result<Vec<LoanPayment>> {
        self.loans.require(organization_id, loan_id).await?;
        self.loans.list_payments(organization_id, loan_id).await
    }

    pub async fn cancel(&self, organization_id: &str, loan_id: &str) -> Result<LoanResponse> {
        let mut loan = self.loans.require(organization_id, loan_id).await?;

        if loan.status.is_closed() {
            return Err(AppError::LoanClosed(format!(
                "Loan {} is already {}",
                loan.id, loan.status
            )));
        }

        loan.status = LoanStatus::Cancelled;
        let saved = self.loans.save_status(&loan).await?;

        info!(organization_id = %organization_id, loan_id = %saved.id, "loan cancelled");
        Ok(LoanResponse::from(saved))
    }

    pub async fn mark_defaulted(
        &self,
        organization_id: &str,
        loan_id: &str,
    ) -> Result<LoanResponse> {
        let mut loan = self.loans.require(organization_id, loan_id).await?;

        if loan.status.is_closed() {
            return Err(AppError::LoanClosed(format!(
                "Loan {} is already {}",
                loan.id, loan.status
            )));
        }
        if loan.status == LoanStatus::Defaulted {
            return Err(AppError::validation("Loan is already defaulted"));
        }

        loan.status = LoanStatus::Defaulted;
        let saved = self.loans.save_status(&loan).await?;

        info!(organization_id = %organization_id, loan_id = %saved.id, "loan marked defaulted");
        Ok(LoanResponse::from(saved))
    }

    /// Hard delete: removes the loan and its payment history outright.
    pub async fn delete(&self, organization_id: &str, loan_id: &str) -> Result<()> {
        let loan = self.loans.require(organization_id, loan_id).await?;
        self.loans.delete(organization_id, &loan).await?;

        info!(organization_id = %organization_id, loan_id = %loan_id, "loan deleted");
        Ok(())
    }
}
