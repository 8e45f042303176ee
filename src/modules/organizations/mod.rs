pub mod models;
pub mod repositories;

pub use models::{MemberRole, OrgContext, Organization, OrganizationMember};
pub use repositories::MembershipRepository;
