pub mod accounts;
pub mod currencies;
pub mod expenses;
pub mod health;
pub mod loans;
pub mod organizations;
pub mod reports;
pub mod subscriptions;
pub mod team;
