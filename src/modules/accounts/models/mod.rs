pub mod expense_account;

pub use expense_account::{AccountType, CreateAccountRequest, ExpenseAccount, UpdateAccountRequest};
