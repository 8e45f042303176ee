pub mod aggregator;
pub mod report_service;

pub use aggregator::ReportAggregator;
pub use report_service::ReportService;
