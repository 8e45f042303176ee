pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{ExpenseReport, ReportData};
pub use repositories::ReportRepository;
pub use services::{ReportAggregator, ReportService};
