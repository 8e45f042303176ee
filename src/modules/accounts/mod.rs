pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{AccountType, ExpenseAccount};
pub use repositories::AccountRepository;
pub use services::AccountService;
