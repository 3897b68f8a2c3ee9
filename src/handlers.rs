pub mod audit_logs;
pub mod auth;
pub mod businesses;
pub mod catalogs;
pub mod invites;
pub mod members;
pub mod subscriptions;
