mod common;

mod auth;
mod join_request;
mod team;
