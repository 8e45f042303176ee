pub mod category;
pub mod expense;

pub use category::{CreateCategoryRequest, ExpenseCategory};
pub use expense::{
    validate_salary_month, CreateExpenseRequest, Expense, ExpenseType, UpdateExpenseRequest,
};
