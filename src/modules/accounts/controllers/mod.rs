pub mod account_controller;

pub use account_controller::configure;
