pub mod currency;
pub mod error;
pub mod money;

pub use currency::{CurrencyCode, RateTable};
pub use error::{AppError, Result};
pub use money::{resolve, MonetaryAmount, RateType, ResolvedAmount};
