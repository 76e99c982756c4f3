pub mod hackathon;
pub mod hackathon_role;
pub mod join_request;
pub mod payment;
pub mod score;
pub mod submission;
pub mod subscription;
pub mod subscription_plan;
pub mod team;
pub mod team_member;
pub mod user;
