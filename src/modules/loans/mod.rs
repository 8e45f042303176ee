pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Loan, LoanPayment, LoanStatus, PaymentType};
pub use repositories::{LoanFilters, LoanRepository};
pub use services::{BalanceTracker, LoanService};
