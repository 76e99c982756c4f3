pub mod auth;
pub mod hackathon;
pub mod join_request;
pub mod payment;
pub mod team;
