pub mod hackathon;
pub mod project;
pub mod result;
pub mod role;
pub mod role_permission;
pub mod score;
pub mod team;
pub mod team_member;
pub mod user;
