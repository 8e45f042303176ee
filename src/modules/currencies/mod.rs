pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{CurrencyRate, SymbolPosition};
pub use repositories::CurrencyRateRepository;
pub use services::CurrencyRateService;
