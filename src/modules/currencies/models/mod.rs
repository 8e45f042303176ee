pub mod currency_rate;

pub use currency_rate::{CurrencyRate, SymbolPosition, UpsertCurrencyRateRequest};
