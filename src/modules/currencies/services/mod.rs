pub mod currency_rate_service;

pub use currency_rate_service::CurrencyRateService;
