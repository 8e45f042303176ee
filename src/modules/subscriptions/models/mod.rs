pub mod subscription;

pub use subscription::{
    CreateSubscriptionRequest, RenewalFrequency, Subscription, SubscriptionStatus,
    UpdateSubscriptionRequest,
};
