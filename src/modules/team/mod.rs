pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{TeamMember, TeamMemberAccount};
pub use repositories::TeamRepository;
pub use services::TeamService;
