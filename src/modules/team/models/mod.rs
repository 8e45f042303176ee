pub mod team_member;

pub use team_member::{
    AssignAccountRequest, CreateTeamMemberRequest, TeamMember, TeamMemberAccount,
    TeamMemberDetail, UpdateTeamMemberRequest,
};
