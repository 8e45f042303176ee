pub mod organization;

pub use organization::{MemberRole, OrgContext, Organization, OrganizationMember};
