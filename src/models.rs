pub mod audit;
pub mod auth;
pub mod business;
pub mod catalog;
pub mod invite;
pub mod membership;
pub mod subscription;
