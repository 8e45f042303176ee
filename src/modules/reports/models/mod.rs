pub mod expense_report;

pub use expense_report::{
    CategorySlice, CreateReportRequest, ExpenseReport, ReportData, TypeTotals,
};
