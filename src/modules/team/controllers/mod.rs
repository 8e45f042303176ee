pub mod team_controller;

pub use team_controller::configure;
