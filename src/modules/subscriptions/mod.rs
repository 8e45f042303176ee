pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{RenewalFrequency, Subscription, SubscriptionStatus};
pub use repositories::SubscriptionRepository;
pub use services::{RenewalCalculator, SubscriptionService};
