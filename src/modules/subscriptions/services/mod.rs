pub mod renewal_calculator;
pub mod subscription_service;

pub use renewal_calculator::RenewalCalculator;
pub use subscription_service::SubscriptionService;
