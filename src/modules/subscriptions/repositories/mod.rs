pub mod subscription_repository;

pub use subscription_repository::SubscriptionRepository;
