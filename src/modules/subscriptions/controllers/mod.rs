pub mod subscription_controller;

pub use subscription_controller::configure;
