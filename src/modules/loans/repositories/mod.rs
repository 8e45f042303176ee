pub mod loan_repository;

pub use loan_repository::{LoanFilters, LoanRepository};
