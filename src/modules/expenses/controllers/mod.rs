pub mod category_controller;
pub mod expense_controller;
