pub mod currency_rate_controller;

pub use currency_rate_controller::configure;
