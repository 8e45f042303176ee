pub mod category_repository;
pub mod expense_repository;

pub use category_repository::CategoryRepository;
pub use expense_repository::{ExpenseFilters, ExpenseRepository};
