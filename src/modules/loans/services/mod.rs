pub mod balance_tracker;
pub mod loan_service;

pub use balance_tracker::{BalanceTracker, PaymentApplication};
pub use loan_service::LoanService;
