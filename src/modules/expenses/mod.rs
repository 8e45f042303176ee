pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Expense, ExpenseCategory, ExpenseType};
pub use repositories::{CategoryRepository, ExpenseRepository};
pub use services::ExpenseService;
