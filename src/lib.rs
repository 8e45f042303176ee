//! Spendbase expense management API
//!
//! Multi-tenant expense tracking for organizations: accounts, expenses,
//! subscriptions, team loans and report snapshots, with multi-currency
//! amounts converted through a fixed per-organization base currency.

pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;

pub use modules::accounts;
pub use modules::currencies;
pub use modules::expenses;
pub use modules::loans;
pub use modules::reports;
pub use modules::subscriptions;
pub use modules::team;
