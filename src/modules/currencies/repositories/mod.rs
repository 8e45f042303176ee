pub mod currency_rate_repository;

pub use currency_rate_repository::CurrencyRateRepository;
