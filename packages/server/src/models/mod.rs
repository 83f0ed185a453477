pub mod achievement;
pub mod auth;
pub mod dashboard;
pub mod hackathon;
pub mod judge;
pub mod project;
pub mod results;
pub mod shared;
pub mod skills;
pub mod team;
